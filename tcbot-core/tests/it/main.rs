mod dispatch;
mod fakes;
