mod action;
mod angle;
mod ball;
mod geom;
mod goal;
mod ids;
mod lazy_map;
mod referee;
mod robot;
mod settings;
mod team;
mod world;

pub mod math;

pub use action::*;
pub use angle::*;
pub use ball::*;
pub use geom::*;
pub use goal::*;
pub use ids::*;
pub use lazy_map::LazyMap;
pub use referee::*;
pub use robot::*;
pub use settings::*;
pub use team::*;
pub use world::*;

pub type Scalar = f64;
pub type Vector2 = nalgebra::Vector2<Scalar>;
pub type Vector3 = nalgebra::Vector3<Scalar>;
