use std::fmt;
use serde::{Deserialize, Serialize};

/// # Label
///
/// The BIO tag set the token classifier was trained on.
///
/// The discriminant of each variant is its column in the label axis of the
/// model's logits, so the order here is fixed and must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    Outside,
    BeginType,
    InsideType,
    BeginBrand,
    InsideBrand,
    BeginVolume,
    InsideVolume,
    BeginPercent,
    InsidePercent,
}

impl Label {
    /// Number of labels, i.e. the expected size of the logits label axis
    pub const COUNT: usize = 9;

    /// All labels in logits column order
    pub const ALL: [Label; Label::COUNT] = [
        Label::Outside,
        Label::BeginType,
        Label::InsideType,
        Label::BeginBrand,
        Label::InsideBrand,
        Label::BeginVolume,
        Label::InsideVolume,
        Label::BeginPercent,
        Label::InsidePercent,
    ];

    /// Looks up the label for a logits column, `None` if out of range.
    pub fn from_id(id: usize) -> Option<Self> {
        Self::ALL.get(id).copied()
    }

    /// Column of this label in the logits label axis
    pub fn id(self) -> usize {
        self as usize
    }

    /// The tag as it appears in the training corpus, e.g. `B-TYPE`.
    pub fn as_str(self) -> &'static str {
        match self {
            Label::Outside => "O",
            Label::BeginType => "B-TYPE",
            Label::InsideType => "I-TYPE",
            Label::BeginBrand => "B-BRAND",
            Label::InsideBrand => "I-BRAND",
            Label::BeginVolume => "B-VOLUME",
            Label::InsideVolume => "I-VOLUME",
            Label::BeginPercent => "B-PERCENT",
            Label::InsidePercent => "I-PERCENT",
        }
    }

    /// The entity kind this tag belongs to, with the BIO prefix removed.
    pub fn kind(self) -> EntityKind {
        match self {
            Label::Outside => EntityKind::Outside,
            Label::BeginType | Label::InsideType => EntityKind::Type,
            Label::BeginBrand | Label::InsideBrand => EntityKind::Brand,
            Label::BeginVolume | Label::InsideVolume => EntityKind::Volume,
            Label::BeginPercent | Label::InsidePercent => EntityKind::Percent,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The externally visible kind of an [`Entity`](crate::span::Entity).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    #[serde(rename = "O")]
    Outside,
    #[serde(rename = "TYPE")]
    Type,
    #[serde(rename = "BRAND")]
    Brand,
    #[serde(rename = "VOLUME")]
    Volume,
    #[serde(rename = "PERCENT")]
    Percent,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Outside => "O",
            EntityKind::Type => "TYPE",
            EntityKind::Brand => "BRAND",
            EntityKind::Volume => "VOLUME",
            EntityKind::Percent => "PERCENT",
        }
    }

    /// The tag that opens a run of this kind.
    pub fn begin_label(self) -> Label {
        match self {
            EntityKind::Outside => Label::Outside,
            EntityKind::Type => Label::BeginType,
            EntityKind::Brand => Label::BeginBrand,
            EntityKind::Volume => Label::BeginVolume,
            EntityKind::Percent => Label::BeginPercent,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_order_matches_model_columns() {
        let names: Vec<&str> = Label::ALL.iter().map(|l| l.as_str()).collect();
        assert_eq!(
            names,
            vec!["O", "B-TYPE", "I-TYPE", "B-BRAND", "I-BRAND", "B-VOLUME", "I-VOLUME", "B-PERCENT", "I-PERCENT"]
        );
        for (idx, label) in Label::ALL.iter().enumerate() {
            assert_eq!(label.id(), idx);
            assert_eq!(Label::from_id(idx), Some(*label));
        }
    }

    #[test]
    fn test_from_id_out_of_range() {
        assert_eq!(Label::from_id(Label::COUNT), None);
        assert_eq!(Label::from_id(usize::MAX), None);
    }

    #[test]
    fn test_kind_strips_bio_prefix() {
        assert_eq!(Label::BeginType.kind(), EntityKind::Type);
        assert_eq!(Label::InsideType.kind(), EntityKind::Type);
        assert_eq!(Label::InsideBrand.kind(), EntityKind::Brand);
        assert_eq!(Label::BeginVolume.kind(), EntityKind::Volume);
        assert_eq!(Label::InsidePercent.kind(), EntityKind::Percent);
        assert_eq!(Label::Outside.kind(), EntityKind::Outside);
    }

    #[test]
    fn test_begin_label_round_trips_kind() {
        for label in Label::ALL {
            assert_eq!(label.kind().begin_label().kind(), label.kind());
        }
    }
}
