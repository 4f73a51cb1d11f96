mod common;

mod aggregate;
mod routing;
