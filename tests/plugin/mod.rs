mod dispatch;
mod lifecycle;
mod settings;
