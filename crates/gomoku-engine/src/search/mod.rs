//! Search algorithms: negamax, forced-win (VCX) searches, proof-number
//! search and Monte-Carlo tree search.

pub mod almost_mcts;
pub mod almost_vcx;
pub mod control;
pub mod mcts;
pub mod negamax;
pub mod pns;
pub mod tt;
pub mod vcx;

pub use almost_mcts::AlmostMctsWin;
pub use almost_vcx::AlmostVcx;
pub use control::{CancelToken, SearchControl};
pub use mcts::VcxMcts;
pub use negamax::{SearchResult, Searcher};
pub use pns::AlmostPnsWin;
pub use vcx::Vcx;
