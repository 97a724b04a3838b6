use std::fmt;

/// Raw result of a runtime call. Negative values are failures; zero and
/// positive values are (qualified) successes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ResultCode(i32);

impl ResultCode {
    pub const SUCCESS: ResultCode = ResultCode(0);
    pub const TIMEOUT_EXPIRED: ResultCode = ResultCode(1);
    pub const ERROR_VALIDATION_FAILURE: ResultCode = ResultCode(-1);
    pub const ERROR_RUNTIME_FAILURE: ResultCode = ResultCode(-2);
    pub const ERROR_OUT_OF_MEMORY: ResultCode = ResultCode(-3);
    pub const ERROR_FUNCTION_UNSUPPORTED: ResultCode = ResultCode(-7);
    pub const ERROR_FEATURE_UNSUPPORTED: ResultCode = ResultCode(-8);
    pub const ERROR_LIMIT_REACHED: ResultCode = ResultCode(-10);
    pub const ERROR_SIZE_INSUFFICIENT: ResultCode = ResultCode(-11);
    pub const ERROR_HANDLE_INVALID: ResultCode = ResultCode(-12);
    pub const ERROR_SPACE_COMPONENT_NOT_SUPPORTED: ResultCode = ResultCode(-1000113000);
    pub const ERROR_SPACE_COMPONENT_NOT_ENABLED: ResultCode = ResultCode(-1000113001);
    pub const ERROR_SPACE_COMPONENT_STATUS_PENDING: ResultCode = ResultCode(-1000113002);
    pub const ERROR_SPACE_COMPONENT_STATUS_ALREADY_SET: ResultCode = ResultCode(-1000113003);

    pub fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    pub fn to_raw(&self) -> i32 {
        self.0
    }

    pub fn is_success(&self) -> bool {
        self.0 >= 0
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    /// Converts into `Ok(())` for any success code, so `?` can be used on raw results
    pub fn into_result(self) -> Result<(), ResultCode> {
        if self.is_success() {
            Ok(())
        } else {
            Err(self)
        }
    }

    pub fn name(&self) -> Option<&'static str> {
        let name = match *self {
            Self::SUCCESS => "XR_SUCCESS",
            Self::TIMEOUT_EXPIRED => "XR_TIMEOUT_EXPIRED",
            Self::ERROR_VALIDATION_FAILURE => "XR_ERROR_VALIDATION_FAILURE",
            Self::ERROR_RUNTIME_FAILURE => "XR_ERROR_RUNTIME_FAILURE",
            Self::ERROR_OUT_OF_MEMORY => "XR_ERROR_OUT_OF_MEMORY",
            Self::ERROR_FUNCTION_UNSUPPORTED => "XR_ERROR_FUNCTION_UNSUPPORTED",
            Self::ERROR_FEATURE_UNSUPPORTED => "XR_ERROR_FEATURE_UNSUPPORTED",
            Self::ERROR_LIMIT_REACHED => "XR_ERROR_LIMIT_REACHED",
            Self::ERROR_SIZE_INSUFFICIENT => "XR_ERROR_SIZE_INSUFFICIENT",
            Self::ERROR_HANDLE_INVALID => "XR_ERROR_HANDLE_INVALID",
            Self::ERROR_SPACE_COMPONENT_NOT_SUPPORTED => "XR_ERROR_SPACE_COMPONENT_NOT_SUPPORTED_FB",
            Self::ERROR_SPACE_COMPONENT_NOT_ENABLED => "XR_ERROR_SPACE_COMPONENT_NOT_ENABLED_FB",
            Self::ERROR_SPACE_COMPONENT_STATUS_PENDING => {
                "XR_ERROR_SPACE_COMPONENT_STATUS_PENDING_FB"
            }
            Self::ERROR_SPACE_COMPONENT_STATUS_ALREADY_SET => {
                "XR_ERROR_SPACE_COMPONENT_STATUS_ALREADY_SET_FB"
            }
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} ({})", name, self.0),
            None => write!(f, "result code {}", self.0),
        }
    }
}
