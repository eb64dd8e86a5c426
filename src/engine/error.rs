use crate::ai::AiError;

/// Why a session could not be started
#[derive(Debug)]
pub enum StartError {
  /// The input parsed to no entries
  EmptyWordList,
  /// A distractor request failed
  OptionsUnavailable(AiError),
  /// Distractors came back but could not form a valid option set
  InvalidOptions { word: String, reason: String },
}

impl std::fmt::Display for StartError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      StartError::EmptyWordList => write!(f, "Word list is empty"),
      StartError::OptionsUnavailable(e) => write!(f, "Could not generate options: {}", e),
      StartError::InvalidOptions { word, reason } => {
        write!(f, "Invalid options for '{}': {}", word, reason)
      }
    }
  }
}

impl std::error::Error for StartError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      StartError::OptionsUnavailable(e) => Some(e),
      _ => None,
    }
  }
}

impl StartError {
  pub fn user_message(&self) -> String {
    match self {
      StartError::EmptyWordList => "Please enter at least one word".to_string(),
      StartError::OptionsUnavailable(_) | StartError::InvalidOptions { .. } => {
        "Could not generate multiple-choice options. Please try again or pick another mode."
          .to_string()
      }
    }
  }

  /// Failure of an upstream collaborator rather than of the input
  pub fn is_upstream(&self) -> bool {
    !matches!(self, StartError::EmptyWordList)
  }
}

/// A rejected command. The session is unchanged when one is returned.
#[derive(Debug)]
pub enum CommandError {
  EmptyAnswer,
  /// The command is not legal in the current phase
  WrongPhase { command: &'static str },
  /// The command does not exist in this quiz mode
  WrongMode { command: &'static str },
  UnknownOption,
  UnknownWord(String),
  /// No unmatched copy of that definition is left
  UnknownDefinition,
  IncompleteMatches { unmatched: usize },
  NoMatchForWord(String),
  NoMissedWords,
  NoCurrentItem,
  EnhancementFailed(AiError),
}

impl std::fmt::Display for CommandError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      CommandError::EmptyAnswer => write!(f, "Answer is empty"),
      CommandError::WrongPhase { command } => write!(f, "'{}' is not allowed right now", command),
      CommandError::WrongMode { command } => {
        write!(f, "'{}' is not available in this quiz mode", command)
      }
      CommandError::UnknownOption => write!(f, "Option is not one of the choices"),
      CommandError::UnknownWord(word) => write!(f, "'{}' is not in this quiz", word),
      CommandError::UnknownDefinition => write!(f, "Definition is not available to match"),
      CommandError::IncompleteMatches { unmatched } => {
        write!(f, "{} word(s) still need a match", unmatched)
      }
      CommandError::NoMatchForWord(word) => write!(f, "'{}' has no match to remove", word),
      CommandError::NoMissedWords => write!(f, "No missed words to practice"),
      CommandError::NoCurrentItem => write!(f, "No current question"),
      CommandError::EnhancementFailed(e) => write!(f, "Enhancement failed: {}", e),
    }
  }
}

impl std::error::Error for CommandError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      CommandError::EnhancementFailed(e) => Some(e),
      _ => None,
    }
  }
}

impl CommandError {
  pub fn user_message(&self) -> String {
    match self {
      CommandError::EmptyAnswer => "Please enter a definition before submitting".to_string(),
      CommandError::EnhancementFailed(_) => {
        "Could not load an extra explanation. Please try again.".to_string()
      }
      other => other.to_string(),
    }
  }

  pub fn is_conflict(&self) -> bool {
    matches!(self, CommandError::WrongPhase { .. })
  }

  pub fn is_upstream(&self) -> bool {
    matches!(self, CommandError::EnhancementFailed(_))
  }
}
