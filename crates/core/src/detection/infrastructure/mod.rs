pub mod null_recognizer;
pub mod scripted_detector;
