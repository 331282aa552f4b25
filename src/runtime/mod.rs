//! The interpreter core: mutable play-through state, the read-mode state
//! machine, visit counting, address resolution and the block-tree walker
//! that drives a session from one paragraph or choice boundary to the next.
//!
//! Split into `path`/`line` (location and narrated output), `visits`
//! (`get_num_visited` bookkeeping), `rng` (`StoryRng`), and `read` (the
//! dispatch loop that actually walks the block tree).

mod address;
mod context;
mod line;
mod path;
mod read;
mod rng;
mod state;
mod visits;

pub use address::{find_label, resolve_address};
pub use context::{HostFn, HostFunctions, ObserverFn, Observers, RuntimeContext};
pub use line::{Line, PresentedChoice};
pub use path::Path;
pub use read::{choose, start};
pub use rng::StoryRng;
pub use state::{ReadMode, State};
pub use visits::VisitCounts;
