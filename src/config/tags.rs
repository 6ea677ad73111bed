use std::fmt;

/// Flags carried by representations and output definitions.
///
/// Known flags get their own variant; anything else is kept verbatim in [`Tag::Other`] so
/// settings written for newer pipelines round-trip unchanged.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tag {
    /// `review`: the representation is a review source.
    Review,
    /// `thumbnail`
    Thumbnail,
    /// `passing`: forwarded without review processing.
    Passing,
    /// `delete`: dropped after extraction.
    Delete,
    /// `need_thumbnail`
    NeedThumbnail,
    /// `no-handles`: render without handles.
    NoHandles,
    /// `no-audio`
    NoAudio,
    /// `sequence`: force an image sequence output.
    Sequence,
    /// `bake-lut`: apply the instance LUT.
    BakeLut,
    /// `reformatted`: the input already has the target format.
    Reformatted,
    /// `clean_name`: drop `outputName` from the derived representation.
    CleanName,
    /// Any other tag, kept verbatim.
    Other(String),
}

impl Tag {
    /// Parse a tag from its settings spelling. Never fails.
    pub fn parse(s: &str) -> Self {
        match s {
            "review" => Self::Review,
            "thumbnail" => Self::Thumbnail,
            "passing" => Self::Passing,
            "delete" => Self::Delete,
            "need_thumbnail" => Self::NeedThumbnail,
            "no-handles" => Self::NoHandles,
            "no-audio" => Self::NoAudio,
            "sequence" => Self::Sequence,
            "bake-lut" => Self::BakeLut,
            // "reformated" is the historical spelling.
            "reformatted" | "reformated" => Self::Reformatted,
            "clean_name" => Self::CleanName,
            other => Self::Other(other.to_string()),
        }
    }

    /// Settings spelling of the tag.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Review => "review",
            Self::Thumbnail => "thumbnail",
            Self::Passing => "passing",
            Self::Delete => "delete",
            Self::NeedThumbnail => "need_thumbnail",
            Self::NoHandles => "no-handles",
            Self::NoAudio => "no-audio",
            Self::Sequence => "sequence",
            Self::BakeLut => "bake-lut",
            Self::Reformatted => "reformatted",
            Self::CleanName => "clean_name",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl serde::Serialize for Tag {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for Tag {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse(&s))
    }
}

/// Ordered, duplicate-free tag list.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(from = "Vec<Tag>", into = "Vec<Tag>")]
pub struct Tags(Vec<Tag>);

impl Tags {
    /// Empty tag list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `tag` is present.
    pub fn contains(&self, tag: &Tag) -> bool {
        self.0.contains(tag)
    }

    /// Append `tag` unless already present. Returns `true` when inserted.
    pub fn insert(&mut self, tag: Tag) -> bool {
        if self.0.contains(&tag) {
            return false;
        }
        self.0.push(tag);
        true
    }

    /// Remove `tag`. Returns `true` when it was present.
    pub fn remove(&mut self, tag: &Tag) -> bool {
        let before = self.0.len();
        self.0.retain(|t| t != tag);
        before != self.0.len()
    }

    /// Tags in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.0.iter()
    }

    /// Number of tags.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no tags.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Tag>> for Tags {
    fn from(tags: Vec<Tag>) -> Self {
        tags.into_iter().collect()
    }
}

impl From<Tags> for Vec<Tag> {
    fn from(tags: Tags) -> Self {
        tags.0
    }
}

impl FromIterator<Tag> for Tags {
    fn from_iter<I: IntoIterator<Item = Tag>>(iter: I) -> Self {
        let mut out = Tags::new();
        for tag in iter {
            out.insert(tag);
        }
        out
    }
}

impl<'a> FromIterator<&'a str> for Tags {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().map(Tag::parse).collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/tags.rs"]
mod tests;
