pub mod cv;
pub mod photo;

pub use cv::{CvData, Education, Experience};
pub use photo::{Photo, PhotoError};
