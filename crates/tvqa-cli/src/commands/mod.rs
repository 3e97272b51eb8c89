pub mod completion;
pub mod config;
pub mod platforms;
pub mod run;
