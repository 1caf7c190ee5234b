//! State module - actions, reducers and the application state they update.

mod actions;
mod api_state;
mod app_state;
mod pagination;


pub use actions::{
    Action, ActionType, FetchAction, FetchOutcome, FetchResponse, Operation, Phase, Query,
};
pub use api_state::{ApiState, ApiStateReducer};
pub use app_state::AppState;
pub use pagination::{query_key, PaginationRecord, PaginationReducer};
