#![forbid(unsafe_code)]

mod courses;
mod rendering;

pub use courses::{course_from_heights, parallel_course_from_heights, shuffle};
pub use rendering::{init_tracing, render_profile_to_png, ProfileConfig, ProfileLine};
