use std::fmt;

use serde::{Deserialize, Serialize};

use super::DomainError;

/// One of the four process stages an admin can open or close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Teachers may publish notices.
    ReleasingNotices,
    /// Stored and editable, but no action consults it.
    CompletePersonalData,
    /// Teachers may upload guide materials.
    UploadPaperGuide,
    /// Students may upload their thesis file.
    UploadEndEvaluate,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::ReleasingNotices,
        Stage::CompletePersonalData,
        Stage::UploadPaperGuide,
        Stage::UploadEndEvaluate,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Stage::ReleasingNotices => "releasing_notices",
            Stage::CompletePersonalData => "complete_personal_data",
            Stage::UploadPaperGuide => "upload_paper_guide",
            Stage::UploadEndEvaluate => "upload_end_evaluate",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Stage::ReleasingNotices => "发布通知",
            Stage::CompletePersonalData => "完善个人资料",
            Stage::UploadPaperGuide => "上传论文指导资料",
            Stage::UploadEndEvaluate => "上传毕业论文",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StageFlag {
    #[default]
    Closed,
    Open,
}

impl StageFlag {
    pub fn from_code(code: &str) -> Result<Self, DomainError> {
        match code {
            "0" => Ok(StageFlag::Closed),
            "1" => Ok(StageFlag::Open),
            other => Err(DomainError::InvalidStageFlag(other.to_string())),
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            StageFlag::Closed => "0",
            StageFlag::Open => "1",
        }
    }

    pub fn is_open(self) -> bool {
        self == StageFlag::Open
    }
}

impl From<bool> for StageFlag {
    fn from(open: bool) -> Self {
        if open { StageFlag::Open } else { StageFlag::Closed }
    }
}

/// The four independent stage flags. Writes overwrite all four at once and
/// no combination is considered inconsistent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProcessStatus {
    pub releasing_notices: StageFlag,
    pub complete_personal_data: StageFlag,
    pub upload_paper_guide: StageFlag,
    pub upload_end_evaluate: StageFlag,
}

impl ProcessStatus {
    pub fn all_closed() -> Self {
        Self::default()
    }

    pub fn all_open() -> Self {
        Self {
            releasing_notices: StageFlag::Open,
            complete_personal_data: StageFlag::Open,
            upload_paper_guide: StageFlag::Open,
            upload_end_evaluate: StageFlag::Open,
        }
    }

    pub fn flag(&self, stage: Stage) -> StageFlag {
        match stage {
            Stage::ReleasingNotices => self.releasing_notices,
            Stage::CompletePersonalData => self.complete_personal_data,
            Stage::UploadPaperGuide => self.upload_paper_guide,
            Stage::UploadEndEvaluate => self.upload_end_evaluate,
        }
    }

    pub fn with(mut self, stage: Stage, flag: StageFlag) -> Self {
        match stage {
            Stage::ReleasingNotices => self.releasing_notices = flag,
            Stage::CompletePersonalData => self.complete_personal_data = flag,
            Stage::UploadPaperGuide => self.upload_paper_guide = flag,
            Stage::UploadEndEvaluate => self.upload_end_evaluate = flag,
        }
        self
    }

    pub fn is_open(&self, stage: Stage) -> bool {
        self.flag(stage).is_open()
    }

    pub fn ensure_open(&self, stage: Stage) -> Result<(), DomainError> {
        if self.is_open(stage) {
            Ok(())
        } else {
            Err(DomainError::StageClosed(stage))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_codes_are_zero_and_one() {
        assert_eq!(StageFlag::from_code("0"), Ok(StageFlag::Closed));
        assert_eq!(StageFlag::from_code("1"), Ok(StageFlag::Open));
        assert_eq!(StageFlag::Open.code(), "1");
        assert_eq!(StageFlag::Closed.code(), "0");
    }

    #[test]
    fn unknown_flag_code_is_rejected() {
        assert_eq!(
            StageFlag::from_code("yes"),
            Err(DomainError::InvalidStageFlag("yes".to_string()))
        );
    }

    #[test]
    fn default_status_is_all_closed() {
        let status = ProcessStatus::default();

        for stage in Stage::ALL {
            assert!(!status.is_open(stage));
            assert_eq!(status.ensure_open(stage), Err(DomainError::StageClosed(stage)));
        }
    }

    #[test]
    fn flags_toggle_independently() {
        let status = ProcessStatus::all_closed().with(Stage::UploadEndEvaluate, StageFlag::Open);

        assert!(status.ensure_open(Stage::UploadEndEvaluate).is_ok());
        assert!(!status.is_open(Stage::UploadPaperGuide));
        assert!(!status.is_open(Stage::ReleasingNotices));
        assert!(!status.is_open(Stage::CompletePersonalData));

        let reopened = ProcessStatus::all_open().with(Stage::ReleasingNotices, StageFlag::Closed);
        assert!(!reopened.is_open(Stage::ReleasingNotices));
        assert!(reopened.is_open(Stage::UploadPaperGuide));
    }
}
