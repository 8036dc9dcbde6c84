//! Conversion of raw Telegram updates into gate events.
//!
//! The sender pool delivers raw TL updates; the gate only cares about
//! inbound text messages in private chats, so everything else is
//! filtered out here. Group and channel traffic is not gated.

use std::collections::HashMap;

use grammers_tl_types as tl;

use crate::auth::UserId;

/// An inbound private-chat message, reduced to what the gate needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Sender identity, normalized for the store.
    pub sender: UserId,

    /// Sender's username, when the update batch carried it.
    pub username: Option<String>,

    /// Telegram message id, needed for deletion.
    pub message_id: i32,

    /// Message text.
    pub text: String,
}

/// Extracts gate-relevant messages from a raw update.
#[must_use]
pub fn extract_messages(updates: &tl::enums::Updates) -> Vec<InboundMessage> {
    match updates {
        tl::enums::Updates::UpdateShortMessage(short) if !short.out => {
            vec![InboundMessage {
                sender: UserId::from(short.user_id),
                username: None,
                message_id: short.id,
                text: short.message.clone(),
            }]
        }
        tl::enums::Updates::Updates(batch) => {
            let usernames = username_map(&batch.users);
            batch
                .updates
                .iter()
                .filter_map(|update| from_update(update, &usernames))
                .collect()
        }
        tl::enums::Updates::Combined(batch) => {
            let usernames = username_map(&batch.users);
            batch
                .updates
                .iter()
                .filter_map(|update| from_update(update, &usernames))
                .collect()
        }
        tl::enums::Updates::UpdateShort(short) => {
            from_update(&short.update, &HashMap::new())
                .into_iter()
                .collect()
        }
        _ => Vec::new(),
    }
}

/// Collects usernames carried alongside an update batch.
fn username_map(users: &[tl::enums::User]) -> HashMap<i64, String> {
    users
        .iter()
        .filter_map(|user| {
            let tl::enums::User::User(user) = user else {
                return None;
            };
            user.username.clone().map(|name| (user.id, name))
        })
        .collect()
}

fn from_update(
    update: &tl::enums::Update,
    usernames: &HashMap<i64, String>,
) -> Option<InboundMessage> {
    let tl::enums::Update::NewMessage(new_message) = update else {
        return None;
    };

    let tl::enums::Message::Message(message) = &new_message.message else {
        return None;
    };

    if message.out {
        return None;
    }

    // Private chats only: the peer is the other party.
    let tl::enums::Peer::User(peer) = &message.peer_id else {
        return None;
    };

    Some(InboundMessage {
        sender: UserId::from(peer.user_id),
        username: usernames.get(&peer.user_id).cloned(),
        message_id: message.id,
        text: message.message.clone(),
    })
}
