mod goto;
mod halt;

pub use goto::{plan_path, Goto, ARRIVAL_TOLERANCE, ORIENTATION_TOLERANCE};
pub use halt::Halt;
