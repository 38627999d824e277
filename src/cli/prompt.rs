//! Interactive prediction session.
//!
//! This is kept separate from clap parsing:
//! - clap handles structured flags/subcommands
//! - the session provides the "run `hpp interactive` and answer questions" UX
//!
//! Each prompt shows its default; Enter accepts it, `q` ends the session, and
//! so does end of input. Choice prompts accept a number from the list or the
//! option's name. The previous request's answers become the next defaults.

use std::io::{BufRead, Write};

use crate::app::pipeline::{Outcome, serve};
use crate::domain::{
    DEFAULT_WARD, DayOfWeek, DistrictTable, HouseType, LegalDocuments, RawInput, RoomCount, ServeConfig,
};
use crate::error::AppError;
use crate::report::{format_failure, format_prediction};

/// Run prompts until the user quits. Returns the number of predictions served.
///
/// Failed requests are printed and the session continues.
pub fn run_session<R: BufRead, W: Write>(input: &mut R, out: &mut W, config: &ServeConfig) -> Result<usize, AppError> {
    let mut prompter = Prompter { input, out };
    let mut defaults = default_input();
    let mut served = 0usize;

    prompter.line("House price range prediction. Press Enter to keep a default, q to quit.")?;

    loop {
        let Some(raw) = prompter.raw_input(&defaults)? else {
            break;
        };

        match serve(config, &raw) {
            Outcome::Predicted(result) => {
                served += 1;
                prompter.line(&format_prediction(&result, config))?;
            }
            Outcome::Failed(err) => prompter.line(&format_failure(&err))?,
        }
        defaults = raw;
    }

    prompter.line("Bye.")?;
    Ok(served)
}

/// Starting answers, matching the one-shot front-end's defaults.
pub fn default_input() -> RawInput {
    RawInput {
        district: "CẦU GIẤY".to_string(),
        ward: DEFAULT_WARD.to_string(),
        house_type: HouseType::Byroad,
        legal_documents: LegalDocuments::Available,
        no_floor: RoomCount::Exact(4),
        no_bedroom: RoomCount::Exact(3),
        length: 11.0,
        width: 4.0,
        area: 44.0,
        day_of_week: DayOfWeek::Monday,
        month: 8,
    }
}

struct Prompter<'a, R, W> {
    input: &'a mut R,
    out: &'a mut W,
}

impl<R: BufRead, W: Write> Prompter<'_, R, W> {
    /// Collect one full request. `None` means the user quit.
    fn raw_input(&mut self, d: &RawInput) -> Result<Option<RawInput>, AppError> {
        let Some(district) = self.district(&d.district)? else {
            return Ok(None);
        };
        let Some(ward) = self.ask("Ward", &d.ward)? else {
            return Ok(None);
        };
        let Some(house_type) = self.choose("House type", &HouseType::ALL, d.house_type, |h| h.as_str().to_string())?
        else {
            return Ok(None);
        };
        let Some(legal_documents) =
            self.choose("Legal documents", &LegalDocuments::ALL, d.legal_documents, |l| l.as_str().to_string())?
        else {
            return Ok(None);
        };
        let Some(no_floor) = self.parsed("Floors (1-10 or GREATER_THAN_10)", d.no_floor, |s| s.parse())? else {
            return Ok(None);
        };
        let Some(no_bedroom) = self.parsed("Bedrooms (1-10 or GREATER_THAN_10)", d.no_bedroom, |s| s.parse())? else {
            return Ok(None);
        };
        let Some(length) = self.parsed("Length (m)", d.length, parse_f64)? else {
            return Ok(None);
        };
        let Some(width) = self.parsed("Width (m)", d.width, parse_f64)? else {
            return Ok(None);
        };
        let Some(area) = self.parsed("Area (m²)", d.area, parse_f64)? else {
            return Ok(None);
        };
        let Some(day_of_week) =
            self.choose("Day of week", &DayOfWeek::ALL, d.day_of_week, |w| w.display_name().to_string())?
        else {
            return Ok(None);
        };
        let Some(month) = self.parsed("Month (1-12)", d.month, parse_month)? else {
            return Ok(None);
        };

        Ok(Some(RawInput {
            district,
            ward,
            house_type,
            legal_documents,
            no_floor,
            no_bedroom,
            length,
            width,
            area,
            day_of_week,
            month,
        }))
    }

    /// District by list number, table id, or any name (used verbatim).
    fn district(&mut self, default: &str) -> Result<Option<String>, AppError> {
        let table = DistrictTable::global();
        self.line("Districts:")?;
        for (idx, d) in table.entries().iter().enumerate() {
            self.line(&format!("{:>3}) {}", idx + 1, d.name))?;
        }

        let Some(answer) = self.ask("District (number, id or name)", default)? else {
            return Ok(None);
        };
        if let Ok(choice) = answer.parse::<usize>() {
            if let Some(d) = choice.checked_sub(1).and_then(|i| table.entries().get(i)) {
                return Ok(Some(d.name.to_string()));
            }
        }
        Ok(Some(
            table
                .by_id(&answer)
                .map(|d| d.name.to_string())
                .unwrap_or(answer),
        ))
    }

    fn choose<T: Copy + PartialEq>(
        &mut self,
        label: &str,
        options: &[T],
        default: T,
        name: impl Fn(T) -> String,
    ) -> Result<Option<T>, AppError> {
        for (idx, opt) in options.iter().enumerate() {
            self.line(&format!("{:>3}) {}", idx + 1, name(*opt)))?;
        }

        loop {
            let Some(answer) = self.ask(label, &name(default))? else {
                return Ok(None);
            };
            if let Ok(choice) = answer.parse::<usize>() {
                if (1..=options.len()).contains(&choice) {
                    return Ok(Some(options[choice - 1]));
                }
                self.line(&format!(
                    "Invalid choice: {choice}. Enter a number between 1 and {}.",
                    options.len()
                ))?;
                continue;
            }
            match options.iter().find(|o| name(**o).eq_ignore_ascii_case(&answer)) {
                Some(opt) => return Ok(Some(*opt)),
                None => self.line(&format!("Unknown option: {answer}"))?,
            }
        }
    }

    /// Re-prompts until `parse` accepts the answer.
    fn parsed<T: ToString>(
        &mut self,
        label: &str,
        default: T,
        parse: impl Fn(&str) -> Result<T, String>,
    ) -> Result<Option<T>, AppError> {
        let default = default.to_string();
        loop {
            let Some(answer) = self.ask(label, &default)? else {
                return Ok(None);
            };
            match parse(&answer) {
                Ok(v) => return Ok(Some(v)),
                Err(e) => self.line(&format!("Invalid value: {e}"))?,
            }
        }
    }

    /// One line of input; empty means `default`, `q` or EOF means quit.
    fn ask(&mut self, label: &str, default: &str) -> Result<Option<String>, AppError> {
        write!(self.out, "{label} [{default}]: ")
            .and_then(|_| self.out.flush())
            .map_err(|e| AppError::io(format!("Failed to write prompt: {e}")))?;

        let mut buf = String::new();
        let bytes = self
            .input
            .read_line(&mut buf)
            .map_err(|e| AppError::io(format!("Failed to read input: {e}")))?;
        if bytes == 0 {
            return Ok(None);
        }

        let answer = buf.trim();
        if answer.eq_ignore_ascii_case("q") {
            return Ok(None);
        }
        if answer.is_empty() {
            return Ok(Some(default.to_string()));
        }
        Ok(Some(answer.to_string()))
    }

    fn line(&mut self, text: &str) -> Result<(), AppError> {
        writeln!(self.out, "{text}").map_err(|e| AppError::io(format!("Failed to write output: {e}")))
    }
}

fn parse_f64(s: &str) -> Result<f64, String> {
    s.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("expected a number, got '{s}'"))
}

fn parse_month(s: &str) -> Result<u8, String> {
    match s.parse::<u8>() {
        Ok(m) if (1..=12).contains(&m) => Ok(m),
        _ => Err(format!("expected a month 1..12, got '{s}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::path::PathBuf;

    fn config() -> ServeConfig {
        ServeConfig {
            model_path: PathBuf::from("models/randomForest_with_area_pipeline.json"),
            fallback_path: PathBuf::from("nowhere/fallback.json"),
            feature_list: None,
            show_chart: false,
            chart_width: 20,
        }
    }

    fn session(script: &str) -> (usize, String) {
        let mut input = Cursor::new(script.as_bytes().to_vec());
        let mut out = Vec::new();
        let n = run_session(&mut input, &mut out, &config()).unwrap();
        (n, String::from_utf8(out).unwrap())
    }

    #[test]
    fn defaults_predict_then_quit() {
        let (n, out) = session(&format!("{}q\n", "\n".repeat(11)));
        assert_eq!(n, 1);
        assert!(out.contains("Predicted price range:"));
        assert!(out.contains("District (number, id or name) [CẦU GIẤY]: "));
        assert!(out.ends_with("Bye.\n"));
    }

    #[test]
    fn invalid_request_is_reported_and_the_session_continues() {
        // Area is the ninth prompt.
        let script = format!("{}0\n\n\n{}44\n\n\n", "\n".repeat(8), "\n".repeat(8));
        let (n, out) = session(&script);
        assert_eq!(n, 1);
        assert!(out.contains("Prediction unavailable (input error): Area must be within"));
        // The rejected area became the next default.
        assert!(out.contains("Area (m²) [0]: "));
    }

    #[test]
    fn choices_accept_numbers_names_and_reprompt() {
        let script = "cau-giay\n\n9\nvilla\n\nGREATER_THAN_10\n\nabc\n6\n\n\nfriday\n13\n12\n\n\nq\n";
        let (n, out) = session(script);
        assert_eq!(n, 1);
        assert!(out.contains("Invalid choice: 9. Enter a number between 1 and 4."));
        assert!(out.contains("Invalid value: expected a number, got 'abc'"));
        assert!(out.contains("Invalid value: expected a month 1..12, got '13'"));
        assert!(out.contains("District (number, id or name) [CẦU GIẤY]: "));
        // Second round starts from the first round's answers.
        assert!(out.contains("House type [VILLA]: "));
    }

    #[test]
    fn end_of_input_ends_the_session() {
        let (n, out) = session("\n\n");
        assert_eq!(n, 0);
        assert!(out.ends_with("Bye.\n"));
    }
}
