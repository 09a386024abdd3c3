use std::str::{FromStr, Split};
use derive_more::{Display, Error};
use teloxide::types::CallbackQuery;

#[derive(Debug, Display, Error)]
pub enum InvalidCallbackData {
    NoData,
    #[display("WrongPrefix(data={data}, prefix={prefix})")]
    WrongPrefix { data: String, prefix: String },
    #[display("MissingPart(data={data}, part={part})")]
    MissingPart { data: String, part: String },
    #[display("InvalidFormat(data={data}, error={error})")]
    InvalidFormat { data: String, error: Box<dyn std::error::Error + Send + Sync> },
}

pub struct InvalidCallbackDataBuilder<'a, T: ToString>(pub &'a T);

impl<'a, T: ToString> InvalidCallbackDataBuilder<'a, T> {
    pub fn wrong_prefix(&self, prefix: impl ToString) -> InvalidCallbackData {
        InvalidCallbackData::WrongPrefix {
            data: self.0.to_string(),
            prefix: prefix.to_string()
        }
    }

    pub fn missing_part(&self, part: &str) -> InvalidCallbackData {
        InvalidCallbackData::MissingPart {
            data: self.0.to_string(),
            part: part.to_owned()
        }
    }

    pub fn parsing_err(&self, err: impl std::error::Error + Send + Sync + 'static) -> InvalidCallbackData {
        InvalidCallbackData::InvalidFormat {
            data: self.0.to_string(),
            error: Box::new(err)
        }
    }
}

/// Prefix-tagged callback payloads: "<prefix>:<data>". The prefix routes the
/// query to its handler; the data part round-trips through Display/TryFrom.
pub trait CallbackDataWithPrefix: TryFrom<String, Error = InvalidCallbackData> + std::fmt::Display {
    fn prefix() -> &'static str;

    fn check_prefix(query: CallbackQuery) -> bool {
        query.data
            .filter(|data| data.starts_with(Self::prefix()))
            .is_some()
    }

    fn parse(query: &CallbackQuery) -> Result<Self, InvalidCallbackData> {
        let data = query.data.as_ref().ok_or(InvalidCallbackData::NoData)?;
        let err = InvalidCallbackDataBuilder(data);
        let value = match data.split_once(':') {
            Some((prefix, rest)) if prefix == Self::prefix() => Ok(rest.to_owned()),
            Some((prefix, _)) => Err(err.wrong_prefix(prefix)),
            None => Err(InvalidCallbackData::NoData)
        }?;
        Self::try_from(value)
    }

    fn to_data_string(&self) -> String {
        format!("{}:{}", Self::prefix(), self)
    }
}

pub fn parse_part<VT, PDT>(parts: &mut Split<char>, err_builder: &InvalidCallbackDataBuilder<VT>, part_name: &str) -> Result<PDT, InvalidCallbackData>
where
    VT: ToString,
    PDT: FromStr,
    <PDT as FromStr>::Err: std::error::Error + Send + Sync + 'static
{
    parts.next()
        .ok_or_else(|| err_builder.missing_part(part_name))
        .and_then(|part| part.parse().map_err(|e| err_builder.parsing_err(e)))
}
