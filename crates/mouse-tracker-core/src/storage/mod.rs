mod naming;
mod trajectory_file;

pub(crate) use trajectory_file::replace_atomically;

pub use naming::{OutputNaming, TRAJECTORY_EXTENSION};
pub use trajectory_file::{
    FIELD_SEPARATOR, LoadedTrajectory, ParseWarning, format_point, load_trajectory, parse_point,
    read_points, save_trajectory, write_points,
};
