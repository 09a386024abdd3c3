use async_trait::async_trait;
use derive_more::{Constructor, Display, Error};
use teloxide::Bot;
use teloxide::requests::Requester;
use teloxide::types::{ChatId, InlineKeyboardButton, InlineKeyboardMarkup, InputFile, MessageId, ReplyMarkup, UserId};

/// A failed call to the chat platform. Carries the transport's own description;
/// per-destination faults are collected into the delivery report instead of
/// aborting the fan-out.
#[derive(Debug, Display, Error, Clone, Constructor)]
#[display("TransportFault({message})")]
pub struct TransportFault {
    #[error(not(source))]
    message: String,
}

impl From<teloxide::RequestError> for TransportFault {
    fn from(value: teloxide::RequestError) -> Self {
        Self { message: value.to_string() }
    }
}

/// A single actionable control attached to a moderator notification.
#[derive(Debug, Clone, Constructor)]
pub struct ActionButton {
    pub label: String,
    pub token: String,
}

/// The chat platform, as far as this bot is concerned. The broadcast pipeline
/// talks to this trait only, which keeps the fan-out logic testable without
/// a live transport.
#[async_trait]
pub trait MessagingGateway: Send + Sync {
    async fn send_text(&self, dest: ChatId, text: &str) -> Result<MessageId, TransportFault>;
    async fn send_photo(&self, dest: ChatId, media_ref: &str, caption: &str) -> Result<MessageId, TransportFault>;
    async fn send_video(&self, dest: ChatId, media_ref: &str, caption: &str) -> Result<MessageId, TransportFault>;
    async fn pin(&self, dest: ChatId, message: MessageId) -> Result<(), TransportFault>;
    async fn unpin_all(&self, dest: ChatId) -> Result<(), TransportFault>;
    async fn notify_moderator(&self, text: &str, button: ActionButton) -> Result<(), TransportFault>;
    async fn acknowledge_sender(&self, dest: ChatId, text: &str) -> Result<(), TransportFault>;
}

#[derive(Clone, Constructor)]
pub struct TelegramGateway {
    bot: Bot,
    moderator_id: UserId,
}

#[async_trait]
impl MessagingGateway for TelegramGateway {
    async fn send_text(&self, dest: ChatId, text: &str) -> Result<MessageId, TransportFault> {
        self.bot.send_message(dest, text)
            .await
            .map(|message| message.id)
            .map_err(Into::into)
    }

    async fn send_photo(&self, dest: ChatId, media_ref: &str, caption: &str) -> Result<MessageId, TransportFault> {
        let mut request = self.bot.send_photo(dest, InputFile::file_id(media_ref));
        request.caption.replace(caption.to_owned());
        request.await
            .map(|message| message.id)
            .map_err(Into::into)
    }

    async fn send_video(&self, dest: ChatId, media_ref: &str, caption: &str) -> Result<MessageId, TransportFault> {
        let mut request = self.bot.send_video(dest, InputFile::file_id(media_ref));
        request.caption.replace(caption.to_owned());
        request.await
            .map(|message| message.id)
            .map_err(Into::into)
    }

    async fn pin(&self, dest: ChatId, message: MessageId) -> Result<(), TransportFault> {
        self.bot.pin_chat_message(dest, message)
            .await
            .map(|_| ())
            .map_err(Into::into)
    }

    async fn unpin_all(&self, dest: ChatId) -> Result<(), TransportFault> {
        self.bot.unpin_all_chat_messages(dest)
            .await
            .map(|_| ())
            .map_err(Into::into)
    }

    async fn notify_moderator(&self, text: &str, button: ActionButton) -> Result<(), TransportFault> {
        let keyboard = InlineKeyboardMarkup::new(
            vec![vec![InlineKeyboardButton::callback(button.label, button.token)]]);
        let mut request = self.bot.send_message(ChatId(self.moderator_id.0 as i64), text);
        request.reply_markup.replace(ReplyMarkup::InlineKeyboard(keyboard));
        request.await
            .map(|_| ())
            .map_err(Into::into)
    }

    async fn acknowledge_sender(&self, dest: ChatId, text: &str) -> Result<(), TransportFault> {
        self.bot.send_message(dest, text)
            .await
            .map(|_| ())
            .map_err(Into::into)
    }
}
