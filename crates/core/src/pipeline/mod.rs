pub mod frame_buffer;
pub mod tracker;

mod detection_worker;
mod recognition_worker;
