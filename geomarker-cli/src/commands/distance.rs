//! Distance command - great-circle distance between two points.

use geomarker::coord::{self, Coordinate};

use super::common::format_distance;
use crate::error::CliError;

/// Arguments for the distance command.
pub struct DistanceArgs {
    pub from: (f64, f64),
    pub to: (f64, f64),
}

/// Run the distance command.
pub fn run(args: DistanceArgs) -> Result<(), CliError> {
    let meters = distance(&args)?;
    println!("{:.1} m ({})", meters, format_distance(meters));
    Ok(())
}

fn distance(args: &DistanceArgs) -> Result<f64, CliError> {
    let from = Coordinate::new(args.from.0, args.from.1);
    let to = Coordinate::new(args.to.0, args.to.1);
    from.validate()?;
    to.validate()?;
    Ok(coord::distance(from, to))
}
