pub mod celebrations;
pub mod particles;
pub mod win_screen;

pub use celebrations::GroupCelebrations;
pub use win_screen::WinScreen;
