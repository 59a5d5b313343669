//! Presentation grouping: fold a flat, chronologically sorted message list
//! into day groups of sender stacks.
//!
//! Pure functions over borrowed input; nothing here touches the network or
//! the caches.  Day boundaries use the machine's local calendar, matching
//! the date headers a user expects to see.

use chrono::{Local, NaiveDate};

use parlor_shared::constants::STACK_WINDOW_SECS;
use parlor_shared::{Message, UserId};

/// Consecutive messages from one sender within the stacking window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageStack {
    pub sender_id: UserId,
    pub items: Vec<Message>,
}

/// All stacks for one local calendar date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayGroup {
    pub date: NaiveDate,
    pub stacks: Vec<MessageStack>,
}

/// Group messages by local calendar date, then fold runs of same-sender
/// messages into stacks.
///
/// A message joins the current stack only when it has the same sender and
/// follows the stack's previous message within the window; otherwise it
/// opens a new stack.  Dates appear in the order first encountered while
/// scanning the input, which for sorted input is chronological.
pub fn group(messages: &[Message]) -> Vec<DayGroup> {
    let mut groups: Vec<DayGroup> = Vec::new();

    for message in messages {
        let date = message.timestamp.with_timezone(&Local).date_naive();
        let idx = match groups.iter().position(|g| g.date == date) {
            Some(idx) => idx,
            None => {
                groups.push(DayGroup {
                    date,
                    stacks: Vec::new(),
                });
                groups.len() - 1
            }
        };
        let day = &mut groups[idx];

        let extends_current = day.stacks.last().is_some_and(|stack| {
            stack.sender_id == message.sender.id
                && stack.items.last().is_some_and(|previous| {
                    (message.timestamp - previous.timestamp).num_seconds() <= STACK_WINDOW_SECS
                })
        });

        if extends_current {
            if let Some(stack) = day.stacks.last_mut() {
                stack.items.push(message.clone());
            }
        } else {
            day.stacks.push(MessageStack {
                sender_id: message.sender.id,
                items: vec![message.clone()],
            });
        }
    }

    groups
}

/// Flatten day groups back into the message list they were built from.
/// `group(&flatten(&g)) == g` for any `g` produced by [`group`].
pub fn flatten(groups: &[DayGroup]) -> Vec<Message> {
    groups
        .iter()
        .flat_map(|day| day.stacks.iter())
        .flat_map(|stack| stack.items.iter().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use parlor_shared::{ChannelId, MessageId, Presence, Sender};

    fn sender(id: i64) -> Sender {
        Sender {
            id: UserId(id),
            username: format!("user-{id}"),
            avatar: String::new(),
            status: Presence::Online,
        }
    }

    fn message(channel_id: ChannelId, sender_id: i64, h: u32, m: u32, s: u32) -> Message {
        // Build in local time so day boundaries are deterministic on any
        // machine running the tests.
        let local = Local.with_ymd_and_hms(2025, 6, 1, h, m, s).unwrap();
        Message {
            id: MessageId::new(),
            channel_id,
            content: format!("{h}:{m}:{s}"),
            timestamp: local.with_timezone(&Utc),
            sender: sender(sender_id),
        }
    }

    #[test]
    fn test_messages_within_window_share_a_stack() {
        let channel = ChannelId::new();
        let messages = vec![
            message(channel, 1, 12, 0, 0),
            message(channel, 1, 12, 1, 30),
        ];

        let groups = group(&messages);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].stacks.len(), 1);
        assert_eq!(groups[0].stacks[0].items.len(), 2);
    }

    #[test]
    fn test_gap_beyond_window_splits_the_stack() {
        let channel = ChannelId::new();
        let messages = vec![
            message(channel, 1, 12, 0, 0),
            message(channel, 1, 12, 2, 30),
        ];

        let groups = group(&messages);
        assert_eq!(groups[0].stacks.len(), 2);
    }

    #[test]
    fn test_window_is_measured_between_consecutive_messages() {
        // Each hop is within the window even though first-to-last is not.
        let channel = ChannelId::new();
        let messages = vec![
            message(channel, 1, 12, 0, 0),
            message(channel, 1, 12, 1, 30),
            message(channel, 1, 12, 3, 0),
        ];

        let groups = group(&messages);
        assert_eq!(groups[0].stacks.len(), 1);
        assert_eq!(groups[0].stacks[0].items.len(), 3);
    }

    #[test]
    fn test_sender_change_splits_the_stack() {
        let channel = ChannelId::new();
        let messages = vec![
            message(channel, 1, 12, 0, 0),
            message(channel, 2, 12, 0, 10),
            message(channel, 1, 12, 0, 20),
        ];

        let groups = group(&messages);
        let senders: Vec<i64> = groups[0].stacks.iter().map(|s| s.sender_id.0).collect();
        assert_eq!(senders, vec![1, 2, 1]);
    }

    #[test]
    fn test_dates_appear_in_scan_order() {
        let channel = ChannelId::new();
        let mut day_two = message(channel, 1, 9, 0, 0);
        day_two.timestamp += chrono::Duration::days(1);
        let messages = vec![message(channel, 1, 23, 59, 0), day_two];

        let groups = group(&messages);
        assert_eq!(groups.len(), 2);
        assert!(groups[0].date < groups[1].date);
    }

    #[test]
    fn test_group_flatten_group_is_idempotent() {
        let channel = ChannelId::new();
        let messages = vec![
            message(channel, 1, 12, 0, 0),
            message(channel, 1, 12, 1, 0),
            message(channel, 2, 12, 1, 10),
            message(channel, 2, 12, 10, 0),
        ];

        let once = group(&messages);
        let twice = group(&flatten(&once));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_input_yields_no_groups() {
        assert!(group(&[]).is_empty());
    }
}
