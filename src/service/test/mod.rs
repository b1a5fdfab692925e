
mod alert;
mod session;
