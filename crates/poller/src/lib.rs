pub mod poll_loop;
pub mod practicum;
pub mod source;

pub use poll_loop::{CycleOutcome, LoopState, PollLoop};
pub use practicum::PracticumClient;
pub use source::HomeworkSource;
