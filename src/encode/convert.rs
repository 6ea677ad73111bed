use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use regex::Regex;

use crate::encode::runner::{run_tool, tool_command};
use crate::foundation::core::path_ext;
use crate::foundation::error::{ReviewError, ReviewResult};

/// String metadata longer than this breaks ffmpeg's EXR reader.
pub const MAX_FFMPEG_STRING_LEN: usize = 8196;
const NOT_ALLOWED_FFMPEG_CHARS: &[char] = &['"'];

static CHAR_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#x?[0-9a-fA-F]+;").expect("valid regex"));

/// Whether an input must be converted before the encoder can read it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConversionDecision {
    /// The encoder reads the input directly.
    NotNeeded,
    /// The input goes through the converter first.
    Needed,
    /// Tooling could not tell; the representation is skipped.
    Undetermined,
}

/// What a converter learned from the first input file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputAnalysis {
    /// Whether to convert.
    pub decision: ConversionDecision,
    /// Layer of a multi-layer image holding the review channels.
    pub layer_name: Option<String>,
}

impl InputAnalysis {
    /// Analysis of an input the encoder can read as is.
    pub fn not_needed() -> Self {
        Self {
            decision: ConversionDecision::NotNeeded,
            layer_name: None,
        }
    }
}

/// Converts inputs the encoder cannot read into a scratch directory, keeping file names.
pub trait InputConverter {
    /// Decide whether the sequence starting with `first_input` needs converting.
    fn analyze(&self, first_input: &Path) -> ReviewResult<InputAnalysis>;
    /// Convert `inputs` into `output_dir` under their own file names.
    fn convert(&self, inputs: &[PathBuf], output_dir: &Path) -> ReviewResult<()>;
}

/// Image metadata as reported by `oiiotool --info -v -i:infoformat=xml`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImageInfo {
    /// Channel names in file order.
    pub channel_names: Vec<String>,
    /// Number of subimages, when reported.
    pub subimages: Option<u32>,
    /// Metadata attributes.
    pub attribs: Vec<ImageAttrib>,
}

/// One metadata attribute of an image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageAttrib {
    /// Attribute name.
    pub name: String,
    /// Type name, e.g. `string`.
    pub kind: String,
    /// Attribute value as text.
    pub value: String,
}

impl ImageAttrib {
    fn is_string(&self) -> bool {
        self.kind == "string"
    }

    /// Reason this attribute breaks ffmpeg, if it does.
    fn ffmpeg_problem(&self) -> Option<String> {
        if !self.is_string() {
            return None;
        }
        if self.value.chars().count() > MAX_FFMPEG_STRING_LEN {
            return Some(format!(
                "has too long value ({} chars)",
                self.value.chars().count()
            ));
        }
        NOT_ALLOWED_FFMPEG_CHARS
            .iter()
            .find(|c| self.value.contains(**c))
            .map(|c| format!("contains unsupported character '{c}'"))
    }
}

/// RGB(A) channel names of one layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReviewChannels {
    /// Layer name, empty for bare `R`, `G`, `B` channels.
    pub layer: String,
    /// Red channel name.
    pub red: String,
    /// Green channel name.
    pub green: String,
    /// Blue channel name.
    pub blue: String,
    /// Alpha channel name, if any.
    pub alpha: Option<String>,
}

/// Layers that carry red, green and blue channels, the unnamed layer first.
pub fn review_layers<S: AsRef<str>>(channel_names: &[S]) -> Vec<ReviewChannels> {
    #[derive(Default)]
    struct Rgba {
        r: Option<String>,
        g: Option<String>,
        b: Option<String>,
        a: Option<String>,
    }

    let mut order: Vec<String> = Vec::new();
    let mut by_layer: Vec<(String, Rgba)> = Vec::new();

    for channel in channel_names {
        let channel = channel.as_ref();
        let (layer, last) = channel.rsplit_once('.').unwrap_or(("", channel));
        let slot = match last.to_ascii_lowercase().as_str() {
            "r" | "red" => 'R',
            "g" | "green" => 'G',
            "b" | "blue" => 'B',
            "a" | "alpha" => 'A',
            _ => continue,
        };
        if !order.iter().any(|l| l == layer) {
            order.push(layer.to_string());
        }
        let idx = match by_layer.iter().position(|(l, _)| l == layer) {
            Some(idx) => idx,
            None => {
                by_layer.push((layer.to_string(), Rgba::default()));
                by_layer.len() - 1
            }
        };
        let rgba = &mut by_layer[idx].1;
        let value = Some(channel.to_string());
        match slot {
            'R' => rgba.r = value,
            'G' => rgba.g = value,
            'B' => rgba.b = value,
            _ => rgba.a = value,
        }
    }

    if let Some(pos) = order.iter().position(String::is_empty) {
        let unnamed = order.remove(pos);
        order.insert(0, unnamed);
    }

    order
        .into_iter()
        .filter_map(|layer| {
            let (_, rgba) = by_layer.iter().find(|(l, _)| *l == layer)?;
            Some(ReviewChannels {
                red: rgba.r.clone()?,
                green: rgba.g.clone()?,
                blue: rgba.b.clone()?,
                alpha: rgba.a.clone(),
                layer,
            })
        })
        .collect()
}

impl ImageInfo {
    /// Value of the attribute `name`.
    pub fn attrib(&self, name: &str) -> Option<&str> {
        self.attribs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    fn has_dwa_compression(&self) -> bool {
        matches!(self.attrib("compression"), Some("dwaa" | "dwab"))
    }

    /// Whether the encoder needs a converted copy of this image.
    pub fn conversion_decision(&self) -> ConversionDecision {
        if self.subimages.is_some_and(|n| n > 1) || self.has_dwa_compression() {
            return ConversionDecision::Needed;
        }
        if review_layers(&self.channel_names).is_empty() {
            return ConversionDecision::Undetermined;
        }
        if self.attribs.iter().any(|a| a.ffmpeg_problem().is_some()) {
            ConversionDecision::Needed
        } else {
            ConversionDecision::NotNeeded
        }
    }

    /// Name of the first review layer, `None` for the unnamed layer.
    pub fn review_layer_name(&self) -> Option<String> {
        review_layers(&self.channel_names)
            .into_iter()
            .next()
            .map(|c| c.layer)
            .filter(|l| !l.is_empty())
    }

    /// `oiiotool` arguments (without the tool itself) converting `input` to `output`.
    pub fn conversion_args(&self, input: &Path, output: &Path) -> ReviewResult<Vec<String>> {
        let channels = review_layers(&self.channel_names)
            .into_iter()
            .next()
            .ok_or_else(|| {
                ReviewError::encode("couldn't find channels that can be used for conversion")
            })?;

        let mut args = vec!["--nosoftwareattrib".to_string()];
        match self.attrib("compression") {
            Some("dwaa" | "dwab") => args.extend(["--compression".into(), "none".into()]),
            Some(other) if !other.is_empty() => {
                args.extend(["--compression".into(), other.to_string()])
            }
            _ => {}
        }

        let mut input_channels = vec![
            channels.red.clone(),
            channels.green.clone(),
            channels.blue.clone(),
        ];
        let mut channels_arg = format!(
            "R={},G={},B={}",
            channels.red, channels.green, channels.blue
        );
        if let Some(alpha) = &channels.alpha {
            channels_arg.push_str(&format!(",A={alpha}"));
            input_channels.push(alpha.clone());
        }
        let input_arg = if self.subimages.is_none_or(|n| n == 1) {
            format!("-i:ch={}", input_channels.join(","))
        } else {
            "-i".to_string()
        };

        args.push(input_arg);
        args.push(input.to_string_lossy().into_owned());
        args.extend([
            "--ch".to_string(),
            channels_arg,
            "--subimage".to_string(),
            "0".to_string(),
        ]);
        for attrib in &self.attribs {
            if let Some(reason) = attrib.ffmpeg_problem() {
                tracing::info!(attribute = %attrib.name, reason, "removing attribute from metadata");
                args.push("--eraseattrib".to_string());
                args.push(attrib.name.clone());
            }
        }
        args.push("-o".to_string());
        args.push(output.to_string_lossy().into_owned());
        Ok(args)
    }
}

/// Parse every `<ImageSpec>` block in `oiiotool` output.
pub fn parse_oiio_info(output: &str) -> ReviewResult<Vec<ImageInfo>> {
    let output = output.replace("\r\n", "\n");
    let mut blocks = Vec::new();
    let mut current: Option<Vec<&str>> = None;
    for line in output.lines() {
        match current.as_mut() {
            None if line.starts_with('<') => current = Some(vec![line]),
            None => {}
            Some(lines) => lines.push(line),
        }
        if line == "</ImageSpec>"
            && let Some(lines) = current.take()
        {
            blocks.push(lines.join("\n"));
        }
    }
    if blocks.is_empty() {
        return Err(ReviewError::encode(format!(
            "no image spec found in oiiotool output: {}",
            output.trim()
        )));
    }
    blocks.iter().map(|b| parse_image_spec(b)).collect()
}

fn parse_image_spec(xml: &str) -> ReviewResult<ImageInfo> {
    // oiiotool writes raw character references such as `&#01;` that are not valid XML.
    let xml = CHAR_REF.replace_all(xml, |caps: &regex::Captures<'_>| {
        format!("&amp;{}", &caps[0][1..])
    });

    let mut reader = Reader::from_str(&xml);
    reader.config_mut().trim_text(true);

    let mut info = ImageInfo::default();
    let mut text = String::new();
    let mut attrib: Option<(String, String)> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if e.name().as_ref() == b"attrib" {
                    attrib = Some((
                        get_attr(&e, b"name").unwrap_or_default(),
                        get_attr(&e, b"type").unwrap_or_default(),
                    ));
                }
                text.clear();
            }
            Ok(Event::Text(e)) => {
                text.push_str(&e.decode().unwrap_or_default());
            }
            Ok(Event::GeneralRef(e)) => {
                let name = e.decode().unwrap_or_default();
                text.push_str(&resolve_entity(&name));
            }
            Ok(Event::End(e)) => {
                match e.name().as_ref() {
                    b"channelname" => info.channel_names.push(text.clone()),
                    b"subimages" => info.subimages = text.trim().parse().ok(),
                    b"attrib" => {
                        if let Some((name, kind)) = attrib.take() {
                            info.attribs.push(ImageAttrib {
                                name,
                                kind,
                                value: text.clone(),
                            });
                        }
                    }
                    _ => {}
                }
                text.clear();
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ReviewError::encode(format!("oiiotool xml error: {e}"))),
            _ => {}
        }
    }
    Ok(info)
}

fn get_attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .map(|a| String::from_utf8_lossy(&a.value).to_string())
}

fn resolve_entity(name: &str) -> String {
    match name {
        "amp" => "&".to_string(),
        "lt" => "<".to_string(),
        "gt" => ">".to_string(),
        "quot" => "\"".to_string(),
        "apos" => "'".to_string(),
        other => {
            let code = other
                .strip_prefix("#x")
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .or_else(|| other.strip_prefix('#').and_then(|dec| dec.parse().ok()));
            code.and_then(char::from_u32)
                .map(String::from)
                .unwrap_or_else(|| format!("&{other};"))
        }
    }
}

/// [`InputConverter`] backed by OpenImageIO's `oiiotool`. Only EXR inputs are inspected.
#[derive(Clone, Debug)]
pub struct OiioConverter {
    tool: Vec<String>,
}

impl OiioConverter {
    /// Converter running `tool` as the oiiotool invocation.
    pub fn new(tool: Vec<String>) -> Self {
        Self { tool }
    }

    fn info(&self, path: &Path) -> ReviewResult<ImageInfo> {
        let mut cmd = tool_command(&self.tool)?;
        cmd.args(["--info", "-v", "-i:infoformat=xml"]).arg(path);
        let stdout = run_tool(cmd, "oiiotool")?;
        parse_oiio_info(&String::from_utf8_lossy(&stdout))?
            .into_iter()
            .next()
            .ok_or_else(|| {
                ReviewError::encode(format!("failed to read input file '{}'", path.display()))
            })
    }
}

impl Default for OiioConverter {
    fn default() -> Self {
        Self::new(vec!["oiiotool".to_string()])
    }
}

impl InputConverter for OiioConverter {
    fn analyze(&self, first_input: &Path) -> ReviewResult<InputAnalysis> {
        if path_ext(first_input) != "exr" {
            return Ok(InputAnalysis::not_needed());
        }
        let info = match self.info(first_input) {
            Ok(info) => info,
            Err(err) => {
                tracing::warn!(path = %first_input.display(), error = %err, "cannot inspect input");
                return Ok(InputAnalysis {
                    decision: ConversionDecision::Undetermined,
                    layer_name: None,
                });
            }
        };
        Ok(InputAnalysis {
            decision: info.conversion_decision(),
            layer_name: info.review_layer_name(),
        })
    }

    #[tracing::instrument(level = "debug", skip(self, inputs), fields(inputs = inputs.len()))]
    fn convert(&self, inputs: &[PathBuf], output_dir: &Path) -> ReviewResult<()> {
        let first = inputs
            .first()
            .ok_or_else(|| ReviewError::validation("nothing to convert"))?;
        if path_ext(first) != "exr" {
            return Err(ReviewError::validation(format!(
                "only exr inputs can be converted, got '{}'",
                first.display()
            )));
        }
        let info = self.info(first)?;

        for input in inputs {
            let file_name = input.file_name().ok_or_else(|| {
                ReviewError::validation(format!("input '{}' has no file name", input.display()))
            })?;
            let args = info.conversion_args(input, &output_dir.join(file_name))?;
            let mut cmd = tool_command(&self.tool)?;
            cmd.args(&args);
            tracing::debug!(args = ?args, "converting input");
            run_tool(cmd, "oiiotool")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/convert.rs"]
mod tests;
