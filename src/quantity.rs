/// 입력 폼에서 단위를 바꿔 받을 수 있는 물리량 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityKind {
    TravelSpeed,
    Length,
    HeatInput,
}

impl QuantityKind {
    /// 내부 기준 단위 기호.
    pub fn base_symbol(&self) -> &'static str {
        match self {
            QuantityKind::TravelSpeed => "mm/s",
            QuantityKind::Length => "mm",
            QuantityKind::HeatInput => "J/mm",
        }
    }
}
