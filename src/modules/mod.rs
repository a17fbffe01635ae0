pub mod candidates;
pub mod controller;
pub mod cursor;
pub mod matcher;
pub mod node;
pub mod ore;
pub mod sim;
pub mod state;
pub mod wait;
pub mod world;
