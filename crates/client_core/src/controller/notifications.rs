use std::time::{Duration, Instant};

use shared::{
    domain::NotificationId,
    i18n::{text, Locale, MessageKey},
};

/// Lifetime of a toast before `expire` drops it.
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(5);

/// Text that is either looked up in the locale table at render time or shown
/// exactly as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalText {
    Key(MessageKey),
    Raw(String),
}

impl LocalText {
    pub fn render(&self, locale: Locale) -> String {
        match self {
            Self::Key(key) => text(locale, *key).to_string(),
            Self::Raw(raw) => raw.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: NotificationId,
    pub kind: NotificationKind,
    pub prefix: Option<MessageKey>,
    pub body: LocalText,
    pub created_at: Instant,
}

impl Notification {
    pub fn render(&self, locale: Locale) -> String {
        let body = self.body.render(locale);
        match self.prefix {
            Some(prefix) => format!("{}{body}", text(locale, prefix)),
            None => body,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) >= NOTIFICATION_TTL
    }
}

#[derive(Debug, Default)]
pub struct Notifications {
    next_id: u64,
    items: Vec<Notification>,
}

impl Notifications {
    pub fn push(
        &mut self,
        kind: NotificationKind,
        prefix: Option<MessageKey>,
        body: LocalText,
    ) -> NotificationId {
        self.push_at(kind, prefix, body, Instant::now())
    }

    pub fn push_at(
        &mut self,
        kind: NotificationKind,
        prefix: Option<MessageKey>,
        body: LocalText,
        created_at: Instant,
    ) -> NotificationId {
        self.next_id += 1;
        let id = NotificationId(self.next_id);
        self.items.push(Notification {
            id,
            kind,
            prefix,
            body,
            created_at,
        });
        id
    }

    pub fn dismiss(&mut self, id: NotificationId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    /// Drops expired toasts, returning how many were removed.
    pub fn expire(&mut self, now: Instant) -> usize {
        let before = self.items.len();
        self.items.retain(|item| !item.is_expired(now));
        before - self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter()
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.items.last()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toasts_expire_after_their_lifetime() {
        let start = Instant::now();
        let mut notifications = Notifications::default();
        notifications.push_at(
            NotificationKind::Error,
            None,
            LocalText::Raw("first".into()),
            start,
        );
        notifications.push_at(
            NotificationKind::Info,
            None,
            LocalText::Raw("second".into()),
            start + Duration::from_secs(3),
        );

        assert_eq!(notifications.expire(start + Duration::from_secs(4)), 0);
        assert_eq!(notifications.expire(start + NOTIFICATION_TTL), 1);
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications.expire(start + Duration::from_secs(9)), 1);
        assert!(notifications.is_empty());
    }

    #[test]
    fn dismiss_removes_only_the_given_toast() {
        let mut notifications = Notifications::default();
        let first = notifications.push(NotificationKind::Error, None, LocalText::Raw("a".into()));
        notifications.push(NotificationKind::Error, None, LocalText::Raw("b".into()));

        assert!(notifications.dismiss(first));
        assert!(!notifications.dismiss(first));
        assert_eq!(notifications.len(), 1);
    }

    #[test]
    fn prefix_is_localized_and_body_is_verbatim() {
        let mut notifications = Notifications::default();
        notifications.push(
            NotificationKind::Error,
            Some(MessageKey::ProcessingErrorPrefix),
            LocalText::Raw("boom".into()),
        );
        let toast = notifications.latest().expect("toast");
        assert_eq!(toast.render(Locale::En), "Processing error: boom");
        assert_eq!(toast.render(Locale::Zh), "处理错误: boom");
    }
}
