use likert_core::{PauseKind, RatingScale, Response};
use likert_experiment::{GatewayError, PresentationConfig, PresentationGateway, TrialParams};
use std::collections::BTreeMap;
use std::io::{BufRead, Write};

/// Line-oriented terminal front end. Every wait reads one line.
pub struct ConsolePresentation<R: BufRead, W: Write> {
    input: R,
    output: W,
    scale: RatingScale,
    dimension: String,
    key_bindings: BTreeMap<String, u8>,
    ask_demographics: bool,
}

impl<R: BufRead, W: Write> ConsolePresentation<R, W> {
    pub fn new(input: R, output: W, scale: RatingScale) -> Self {
        Self {
            input,
            output,
            scale,
            dimension: String::new(),
            key_bindings: BTreeMap::new(),
            ask_demographics: false,
        }
    }

    pub fn with_demographics(mut self, ask: bool) -> Self {
        self.ask_demographics = ask;
        self
    }

    fn read_line(&mut self) -> Result<String, GatewayError> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(GatewayError::Closed);
        }
        Ok(line.trim().to_string())
    }

    fn wait_for_enter(&mut self, prompt: &str) -> Result<(), GatewayError> {
        write!(self.output, "{prompt} ")?;
        self.output.flush()?;
        self.read_line().map(|_| ())
    }

    fn parse(&self, line: &str) -> Response {
        if line.is_empty() {
            return Response::NoSelection;
        }
        match self.key_bindings.get(line) {
            Some(&value) => Response::Selected(i64::from(value)),
            None => Response::Raw(line.to_string()),
        }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> PresentationGateway for ConsolePresentation<R, W> {
    fn show_instructions(&mut self, config: &PresentationConfig) -> Result<(), GatewayError> {
        self.dimension = config.dimension.clone();
        self.key_bindings = config.key_bindings.clone();
        writeln!(
            self.output,
            "You will see a series of websites. Rate each one for its {}.",
            config.dimension
        )?;
        writeln!(
            self.output,
            "{} = {}, {} = {}.",
            self.scale.min, config.low_label, self.scale.max, config.high_label
        )?;
        if !self.key_bindings.is_empty() {
            let keys: Vec<String> = self
                .key_bindings
                .iter()
                .map(|(key, value)| format!("{key}={value}"))
                .collect();
            writeln!(self.output, "Keys: {}", keys.join(" "))?;
        }
        Ok(())
    }

    fn collect_demographics(&mut self) -> Result<Option<String>, GatewayError> {
        if !self.ask_demographics {
            return Ok(None);
        }
        write!(self.output, "Demographics (form fields as JSON, blank to skip): ")?;
        self.output.flush()?;
        let line = self.read_line()?;
        Ok((!line.is_empty()).then_some(line))
    }

    fn await_ready(&mut self) -> Result<(), GatewayError> {
        self.wait_for_enter("Press Enter to start.")
    }

    fn show_pause(&mut self, kind: PauseKind) -> Result<(), GatewayError> {
        let text = match kind {
            PauseKind::BeforeBlock1 => "Practice is over. The real trials begin now.",
            PauseKind::BeforeBlock2 => "Time for a break. Part 2 follows.",
        };
        writeln!(self.output, "{text}")?;
        Ok(())
    }

    fn await_resume(&mut self, _kind: PauseKind) -> Result<(), GatewayError> {
        self.wait_for_enter("Press Enter to continue.")
    }

    fn display(&mut self, trial: &TrialParams) -> Result<(), GatewayError> {
        let part = match trial.block_number {
            0 => "Practice".to_string(),
            n => format!("Part {n}"),
        };
        writeln!(
            self.output,
            "{part}, image {} of {}: {}",
            trial.within_block_position, trial.block_size, trial.stimulus
        )?;
        Ok(())
    }

    fn await_rating(&mut self, _trial: &TrialParams) -> Result<Response, GatewayError> {
        write!(
            self.output,
            "{} [{}-{}]: ",
            self.dimension, self.scale.min, self.scale.max
        )?;
        self.output.flush()?;
        let line = self.read_line()?;
        Ok(self.parse(&line))
    }

    fn prompt_selection(&mut self, _trial: &TrialParams) -> Result<(), GatewayError> {
        writeln!(self.output, "Please make a selection before pressing Enter.")?;
        Ok(())
    }

    fn await_next(&mut self) -> Result<(), GatewayError> {
        self.wait_for_enter("Press Enter for the next image.")
    }

    fn show_completion(&mut self) -> Result<(), GatewayError> {
        writeln!(self.output, "All done, thank you! Submitting your responses.")?;
        self.output.flush()?;
        Ok(())
    }
}
