pub mod driver;
pub mod environment;
pub mod kinematics;
pub mod laps;
pub mod race;
pub mod session;
pub mod tires;
pub mod track;
pub mod vehicle;
