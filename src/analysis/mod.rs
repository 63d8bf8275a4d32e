//! @ai:module:intent A/B significance testing and regression monitoring
//! @ai:module:layer application
//! @ai:module:public_api SignificanceTester, AbComparison, Verdict, RegressionMonitor, Alert

pub mod monitor;
pub mod significance;

pub use monitor::{Alert, AlertHandler, AlertSeverity, AlertType, RegressionMonitor};
pub use significance::{
    AbComparison, SignificanceTester, SignificanceTesterTrait, Verdict, DEFAULT_Z_THRESHOLD,
};
