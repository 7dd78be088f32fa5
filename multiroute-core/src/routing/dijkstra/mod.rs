mod state;
pub mod traced_dijkstra;

pub use traced_dijkstra::{ShortestPath, dijkstra_path};
