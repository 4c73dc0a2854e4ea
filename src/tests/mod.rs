mod auction;
mod canvas;
mod countdown;
mod http;
