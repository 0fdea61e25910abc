//! Interactive stat-line prompt for the `predict` subcommand

use crate::error::{Result, StatsError};
use crate::model::{FeatureVector, SeasonType, FEATURE_COUNT, FEATURE_NAMES};
use crate::predict::{Prediction, SearchScope, SeasonModels};
use std::io::{BufRead, Write};

fn read_line<R: BufRead>(input: &mut R) -> Result<String> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(StatsError::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "input closed",
        )));
    }
    Ok(line.trim().to_string())
}

/// Ask for the season type; an invalid answer is reported and ends the session
pub fn ask_season<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<SeasonType> {
    write!(output, "Would you like a Regular Season (R) or Playoff (P) comparison? ")?;
    output.flush()?;
    let answer = read_line(input)?;
    match SeasonType::from_code(&answer) {
        Ok(season) => {
            writeln!(output, "\nYou selected: {} Comparison", season)?;
            Ok(season)
        }
        Err(err) => {
            writeln!(output, "\nInvalid input. Please restart and enter 'R' or 'P'.")?;
            Err(err)
        }
    }
}

/// Ask for the eight feature values in comparison order
pub fn ask_features<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<FeatureVector> {
    writeln!(output, "\nPlease enter the following stats:")?;
    let mut values = [0.0; FEATURE_COUNT];
    for (i, name) in FEATURE_NAMES.iter().enumerate() {
        write!(output, "{}: ", name)?;
        output.flush()?;
        let answer = read_line(input)?;
        values[i] = answer
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| StatsError::InvalidValue {
                column: name.to_string(),
                row: 1,
                value: answer.clone(),
            })?;
    }
    Ok(FeatureVector::from_array(values))
}

pub fn print_prediction<W: Write>(output: &mut W, prediction: &Prediction) -> Result<()> {
    writeln!(output, "\n--- Prediction Results ---")?;
    writeln!(output, "Predicted Player Type: {}", prediction.label_text())?;
    writeln!(output, "Most similar NBA Player: {}", prediction.closest_player)?;
    Ok(())
}

/// Full session: season, models for that season, stat line, result.
/// Only the chosen season's artifacts are loaded.
pub fn run_session<R, W, L>(input: &mut R, output: &mut W, load: L, scope: SearchScope) -> Result<Prediction>
where
    R: BufRead,
    W: Write,
    L: FnOnce(SeasonType) -> Result<SeasonModels>,
{
    let season = ask_season(input, output)?;
    let models = load(season)?;
    let features = ask_features(input, output)?;
    let prediction = models.predict(&features, scope)?;
    print_prediction(output, &prediction)?;
    Ok(prediction)
}
