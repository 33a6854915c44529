//! 용접 입력값에 쓰이는 단위 정의 및 변환 모듈 모음.

pub mod heat_input;
pub mod length;
pub mod velocity;

pub use heat_input::{convert_heat_input, heat_input_from_j_per_mm, HeatInputUnit};
pub use length::{convert_length, length_to_mm, LengthUnit};
pub use velocity::{convert_velocity, velocity_to_mm_per_s, VelocityUnit};
