mod atomicity;
mod optimize;
mod step;
