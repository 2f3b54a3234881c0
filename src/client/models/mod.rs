pub mod draft;
pub mod notification;
pub mod wallpaper;
