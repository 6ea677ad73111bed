use std::collections::{BTreeMap, BTreeSet};

/// Numbered files sharing a head, tail and padding, e.g. `shot.%04d.exr`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameCollection {
    /// Text before the frame number.
    pub head: String,
    /// Text after the frame number.
    pub tail: String,
    /// Zero-padding width, `0` for unpadded numbers.
    pub padding: usize,
    /// Frame numbers present.
    pub frames: BTreeSet<i64>,
}

impl FrameCollection {
    /// Group `names` into collections by their last run of digits.
    ///
    /// Returns the collections (ordered by head, tail, padding) and the names that do not
    /// belong to any collection.
    pub fn assemble<S: AsRef<str>>(names: &[S]) -> (Vec<FrameCollection>, Vec<String>) {
        #[derive(Default)]
        struct Group {
            padded: BTreeMap<usize, BTreeSet<i64>>,
            unpadded: BTreeMap<usize, BTreeSet<i64>>,
        }

        let mut groups: BTreeMap<(String, String), Group> = BTreeMap::new();
        let mut remainder = Vec::new();

        for name in names {
            let name = name.as_ref();
            let Some((head, digits, tail)) = split_frame_number(name) else {
                remainder.push(name.to_string());
                continue;
            };
            let Ok(frame) = digits.parse::<i64>() else {
                remainder.push(name.to_string());
                continue;
            };
            let group = groups
                .entry((head.to_string(), tail.to_string()))
                .or_default();
            let width = digits.len();
            if width > 1 && digits.starts_with('0') {
                group.padded.entry(width).or_default().insert(frame);
            } else {
                group.unpadded.entry(width).or_default().insert(frame);
            }
        }

        let mut collections = Vec::new();
        for ((head, tail), mut group) in groups {
            // Unpadded numbers of a padded width belong to that padded collection
            // (`0999`, `1000`, `1001` is one `%04d` sequence).
            let widths: Vec<usize> = group.padded.keys().copied().collect();
            for width in widths {
                if let Some(frames) = group.unpadded.remove(&width)
                    && let Some(padded) = group.padded.get_mut(&width)
                {
                    padded.extend(frames);
                }
            }

            // A run of one fixed width with no leading zeros (`1001`..`1005`) is read as
            // padded to that width, so holes below it are named `0999`.
            if group.padded.is_empty()
                && group.unpadded.len() == 1
                && let Some((&width, _)) = group.unpadded.first_key_value()
                && width > 1
                && let Some(frames) = group.unpadded.remove(&width)
            {
                group.padded.insert(width, frames);
            }

            let mut unpadded_all = BTreeSet::new();
            for frames in group.unpadded.into_values() {
                unpadded_all.extend(frames);
            }
            if !unpadded_all.is_empty() {
                collections.push(FrameCollection {
                    head: head.clone(),
                    tail: tail.clone(),
                    padding: 0,
                    frames: unpadded_all,
                });
            }
            for (padding, frames) in group.padded {
                collections.push(FrameCollection {
                    head: head.clone(),
                    tail: tail.clone(),
                    padding,
                    frames,
                });
            }
        }

        (collections, remainder)
    }

    /// printf-style pattern, e.g. `shot.%04d.exr` or `shot.%d.exr`.
    pub fn pattern(&self) -> String {
        if self.padding == 0 {
            format!("{}%d{}", self.head, self.tail)
        } else {
            format!("{}%0{}d{}", self.head, self.padding, self.tail)
        }
    }

    /// File name of `frame` in this collection.
    pub fn file_name(&self, frame: i64) -> String {
        format!(
            "{}{:0width$}{}",
            self.head,
            frame,
            self.tail,
            width = self.padding
        )
    }

    /// Lowest frame present.
    pub fn first_frame(&self) -> Option<i64> {
        self.frames.first().copied()
    }

    /// Whether `frame` is present.
    pub fn contains(&self, frame: i64) -> bool {
        self.frames.contains(&frame)
    }
}

/// Split `name` around its last run of ASCII digits.
fn split_frame_number(name: &str) -> Option<(&str, &str, &str)> {
    let bytes = name.as_bytes();
    let end = bytes.iter().rposition(u8::is_ascii_digit)? + 1;
    let start = bytes[..end]
        .iter()
        .rposition(|b| !b.is_ascii_digit())
        .map_or(0, |p| p + 1);
    Some((&name[..start], &name[start..end], &name[end..]))
}

#[cfg(test)]
#[path = "../../tests/unit/sequence/collection.rs"]
mod tests;
