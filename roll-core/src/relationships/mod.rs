//! Social-graph core: the relationship manager and its live read-models.
//!
//! The manager owns every mutation of the friend / pending / blocked graph
//! and is the only writer allowed to touch more than one user document at a
//! time. The read-models in this module are explicit, subscription-backed
//! values for the screens that render the graph.

mod candidates;
mod friends;
pub(crate) mod live;
mod manager;
mod requests;
mod types;

pub use candidates::{Candidate, CandidateList};
pub use friends::{FriendList, FriendProfile};
pub use live::LiveHandle;
pub use manager::RelationshipManager;
pub use requests::{IncomingRequest, IncomingRequests};
pub use types::{RelationshipError, RelationshipState, RequestDecision};
