//! JSON으로 내보낸 랜덤 포레스트 회귀 파이프라인.
//!
//! 전처리는 입력 열 순서대로 적용한다. 범주형 열은 범주 수만큼 원-핫 칸으로,
//! 수치형 열은 한 칸으로 펼친다. 트리 분기는 `x[feature] <= threshold`이면 왼쪽이며
//! 포레스트 출력은 트리 출력의 평균이다.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::predictor::{HardnessPredictor, ModelError, ModelInfo};
use crate::welding::{FeatureRecord, FeatureValue};

/// 지원하는 아티팩트 형식 버전.
pub const FORMAT_VERSION: u32 = 1;

/// 학습에 없던 범주를 만났을 때의 처리 방식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownCategory {
    #[default]
    Error,
    /// 원-핫 칸을 모두 0으로 둔다
    Ignore,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputColumn {
    Numeric {
        name: String,
    },
    Categorical {
        name: String,
        categories: Vec<String>,
        #[serde(default)]
        handle_unknown: UnknownCategory,
    },
}

impl InputColumn {
    pub fn name(&self) -> &str {
        match self {
            InputColumn::Numeric { name } | InputColumn::Categorical { name, .. } => name.as_str(),
        }
    }

    fn width(&self) -> usize {
        match self {
            InputColumn::Numeric { .. } => 1,
            InputColumn::Categorical { categories, .. } => categories.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    fn evaluate(&self, x: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if x[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

/// 디스크에 저장되는 아티팩트 원형.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestArtifact {
    pub format_version: u32,
    pub name: String,
    #[serde(default = "default_target")]
    pub target: String,
    pub inputs: Vec<InputColumn>,
    pub trees: Vec<Tree>,
}

fn default_target() -> String {
    "Hardness (HRC)".to_string()
}

/// 아티팩트 파싱/구조 검사 오류.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("JSON 파싱 실패: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("지원하지 않는 형식 버전 {found} (지원: {FORMAT_VERSION})")]
    UnsupportedVersion { found: u32 },
    #[error("입력 열이 없습니다")]
    NoInputs,
    #[error("범주형 입력 '{0}'에 범주가 없습니다")]
    EmptyCategories(String),
    #[error("트리가 없습니다")]
    NoTrees,
    #[error("트리 {tree}: {reason}")]
    BadTree { tree: usize, reason: String },
}

/// 구조 검사를 통과해 메모리에 올라간 랜덤 포레스트 모델.
#[derive(Debug, Clone)]
pub struct RandomForestModel {
    artifact: ForestArtifact,
    feature_names: Vec<String>,
    encoded_width: usize,
}

impl RandomForestModel {
    /// JSON 바이트에서 모델을 읽고 구조를 검사한다.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ArtifactError> {
        let artifact: ForestArtifact = serde_json::from_slice(bytes)?;
        Self::from_artifact(artifact)
    }

    pub fn from_artifact(artifact: ForestArtifact) -> Result<Self, ArtifactError> {
        if artifact.format_version != FORMAT_VERSION {
            return Err(ArtifactError::UnsupportedVersion {
                found: artifact.format_version,
            });
        }
        if artifact.inputs.is_empty() {
            return Err(ArtifactError::NoInputs);
        }
        for col in &artifact.inputs {
            if let InputColumn::Categorical {
                name, categories, ..
            } = col
            {
                if categories.is_empty() {
                    return Err(ArtifactError::EmptyCategories(name.clone()));
                }
            }
        }
        if artifact.trees.is_empty() {
            return Err(ArtifactError::NoTrees);
        }
        let encoded_width = artifact.inputs.iter().map(InputColumn::width).sum();
        for (t, tree) in artifact.trees.iter().enumerate() {
            check_tree(tree, encoded_width)
                .map_err(|reason| ArtifactError::BadTree { tree: t, reason })?;
        }
        let feature_names = artifact
            .inputs
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        Ok(Self {
            artifact,
            feature_names,
            encoded_width,
        })
    }

    pub fn name(&self) -> &str {
        &self.artifact.name
    }

    pub fn tree_count(&self) -> usize {
        self.artifact.trees.len()
    }

    /// 레코드를 원-핫/수치 벡터로 펼친다.
    fn encode(&self, record: &FeatureRecord) -> Result<Vec<f64>, ModelError> {
        let mut x = Vec::with_capacity(self.encoded_width);
        let mut values = record.iter();
        for col in &self.artifact.inputs {
            let value = match values.next() {
                Some((name, v)) if *name == col.name() => *v,
                _ => {
                    return Err(ModelError::MissingFeature {
                        feature: col.name().to_string(),
                    })
                }
            };
            match (col, value) {
                (InputColumn::Numeric { .. }, FeatureValue::Number(n)) => x.push(n),
                (
                    InputColumn::Categorical {
                        name,
                        categories,
                        handle_unknown,
                    },
                    FeatureValue::Category(label),
                ) => {
                    let hit = categories.iter().position(|c| c == label);
                    if hit.is_none() && *handle_unknown == UnknownCategory::Error {
                        return Err(ModelError::UnknownCategory {
                            feature: name.clone(),
                            value: label.to_string(),
                        });
                    }
                    x.extend((0..categories.len()).map(|i| if Some(i) == hit { 1.0 } else { 0.0 }));
                }
                (col, _) => {
                    return Err(ModelError::KindMismatch {
                        feature: col.name().to_string(),
                    })
                }
            }
        }
        Ok(x)
    }
}

/// 자식 인덱스가 부모보다 뒤에 있어야 순환 없이 잎에 도달한다.
fn check_tree(tree: &Tree, width: usize) -> Result<(), String> {
    if tree.nodes.is_empty() {
        return Err("노드가 없습니다".into());
    }
    let n = tree.nodes.len();
    for (i, node) in tree.nodes.iter().enumerate() {
        match node {
            Node::Leaf { value } => {
                if !value.is_finite() {
                    return Err(format!("노드 {i}의 잎 값이 유한하지 않습니다"));
                }
            }
            Node::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if *feature >= width {
                    return Err(format!("노드 {i}의 특성 인덱스 {feature} >= {width}"));
                }
                if !threshold.is_finite() {
                    return Err(format!("노드 {i}의 임계값이 유한하지 않습니다"));
                }
                for child in [*left, *right] {
                    if child <= i || child >= n {
                        return Err(format!("노드 {i}의 자식 인덱스 {child}가 잘못되었습니다"));
                    }
                }
            }
        }
    }
    Ok(())
}

impl HardnessPredictor for RandomForestModel {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict(&self, record: &FeatureRecord) -> Result<f64, ModelError> {
        let x = self.encode(record)?;
        let sum: f64 = self.artifact.trees.iter().map(|t| t.evaluate(&x)).sum();
        let mean = sum / self.artifact.trees.len() as f64;
        if mean.is_finite() {
            Ok(mean)
        } else {
            Err(ModelError::NonFinite)
        }
    }

    fn info(&self) -> ModelInfo {
        ModelInfo {
            name: self.artifact.name.clone(),
            algorithm: "Random Forest Regressor",
            target: self.artifact.target.clone(),
            inputs: self.feature_names.clone(),
            estimators: self.artifact.trees.len(),
        }
    }
}
