// Dialogue state machine for free-text replies
#[derive(Clone, Default, Debug)]
pub enum State {
    #[default]
    Start,
    AwaitingSearchTerm,
    AwaitingHoldings {
        token_id: String,
    },
}
