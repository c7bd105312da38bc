mod episode;
mod failure;
mod registry;
mod rendering;
mod rewards;
mod server;
