pub mod preview;
pub mod score;
pub mod verify;
