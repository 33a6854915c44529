//! 용접 조건 입력, 입열량 계산, 모델 입력 레코드 구성.

pub mod features;
pub mod heat_input;
pub mod params;

pub use features::{assemble, Extract, FeatureRecord, FeatureSchema, FeatureValue, SchemaMismatch};
pub use heat_input::heat_input_j_per_mm;
pub use params::{GrooveType, ValidParameters, ValidationError, WeldMethod, WeldType, WeldingParameters};
