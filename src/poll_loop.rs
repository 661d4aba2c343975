use std::{thread, time::Duration};

use crossbeam_channel::{Receiver, RecvTimeoutError};
use log::{debug, error, info};

use crate::{
    fault::CycleFault,
    message_source::MessageSource,
    notifier::{NotificationState, Notifier},
    response,
    status_client::StatusSource,
    verdict,
};

/// Polls the status API, reports the latest homework status once per change
/// and reports any failure the same way. Only the first homework of each
/// response is looked at.
pub(crate) struct PollLoop<S, N> {
    source: S,
    notifier: N,
    watermark: i64,
    notification_state: NotificationState,
    retry_period: Duration,
    rx_stop: Receiver<()>,
}

impl<S, N> PollLoop<S, N>
where
    S: StatusSource,
    N: Notifier,
{
    pub(crate) fn new(
        source: S,
        notifier: N,
        watermark: i64,
        retry_period: Duration,
        rx_stop: Receiver<()>,
    ) -> Self {
        Self {
            source,
            notifier,
            watermark,
            notification_state: NotificationState::default(),
            retry_period,
            rx_stop,
        }
    }

    pub(crate) fn watermark(&self) -> i64 {
        self.watermark
    }

    /// Runs one cycle. Faults are logged and sent on as notifications, never
    /// returned.
    pub(crate) fn poll(&mut self) {
        if let Err(fault) = self.run_cycle() {
            error!("Poll from {} failed: {}", self.watermark(), fault);
            let message = format!("Сбой в работе программы: {fault}");
            self.notification_state
                .notify_if_changed(&self.notifier, &message);
        }
    }

    fn run_cycle(&mut self) -> Result<(), CycleFault> {
        let raw = self.source.fetch(self.watermark)?;
        let response = response::validate(raw)?;

        match response.homeworks.first() {
            None => debug!("No homework status changes since {}", self.watermark),
            Some(homework) => {
                let message = verdict::interpret(homework)?;
                self.notification_state
                    .notify_if_changed(&self.notifier, &message);
            }
        }

        if let Some(current_date) = response.current_date {
            if current_date != self.watermark {
                info!("Advancing watermark {} -> {}", self.watermark, current_date);
            }
            self.watermark = current_date;
        }

        Ok(())
    }

    /// Waits out the retry period. Returns `true` if a stop was requested.
    fn sleep(&self) -> bool {
        match self.rx_stop.recv_timeout(self.retry_period) {
            Ok(()) => true,
            Err(RecvTimeoutError::Timeout) => false,
            Err(RecvTimeoutError::Disconnected) => {
                // Nobody can ask us to stop any more, keep polling.
                thread::sleep(self.retry_period);
                false
            }
        }
    }
}

impl<S, N> MessageSource for PollLoop<S, N>
where
    S: StatusSource,
    N: Notifier,
{
    // Cycle faults are reported, not returned, so this never yields `Err`
    // and the loop only ends on a stop request.
    fn run(&mut self) -> anyhow::Result<bool> {
        self.poll();
        Ok(self.sleep())
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::VecDeque, time::Duration};

    use crossbeam_channel::{unbounded, Sender};
    use serde_json::{json, Value};

    use crate::{
        fault::NetworkFault,
        message_source::{run_message_source, MessageSource},
        notifier::tests::FakeNotifier,
        status_client::StatusSource,
    };

    use super::PollLoop;

    const REVIEWING_HW1: &str =
        "Изменился статус проверки работы \"hw1\". Работа взята на проверку ревьюером.";

    struct FakeSource {
        responses: VecDeque<Result<Value, NetworkFault>>,
        requested: Vec<i64>,
    }

    impl FakeSource {
        fn new(responses: Vec<Result<Value, NetworkFault>>) -> Self {
            Self {
                responses: responses.into(),
                requested: Vec::new(),
            }
        }
    }

    impl StatusSource for FakeSource {
        fn fetch(&mut self, watermark: i64) -> Result<Value, NetworkFault> {
            self.requested.push(watermark);
            self.responses
                .pop_front()
                .unwrap_or(Err(NetworkFault::Status(500)))
        }
    }

    fn new_poll_loop(
        responses: Vec<Result<Value, NetworkFault>>,
    ) -> (PollLoop<FakeSource, FakeNotifier>, Sender<()>) {
        let (tx_stop, rx_stop) = unbounded();
        let poll_loop = PollLoop::new(
            FakeSource::new(responses),
            FakeNotifier::default(),
            0,
            Duration::ZERO,
            rx_stop,
        );
        (poll_loop, tx_stop)
    }

    fn sent(poll_loop: &PollLoop<FakeSource, FakeNotifier>) -> Vec<String> {
        poll_loop.notifier.sent.borrow().clone()
    }

    #[test]
    fn status_change_dedup_empty_and_unknown_status() {
        let scenario_a = json!({
            "homeworks": [{"homework_name": "hw1", "status": "reviewing"}],
            "current_date": 1000
        });
        let (mut poll_loop, _tx_stop) = new_poll_loop(vec![
            Ok(scenario_a.clone()),
            Ok(scenario_a),
            Ok(json!({"homeworks": [], "current_date": 2000})),
            Ok(json!({
                "homeworks": [{"homework_name": "hw2", "status": "bogus"}],
                "current_date": 3000
            })),
        ]);

        poll_loop.poll();
        assert_eq!(sent(&poll_loop), vec![REVIEWING_HW1]);
        assert_eq!(poll_loop.watermark(), 1000);

        poll_loop.poll();
        assert_eq!(sent(&poll_loop), vec![REVIEWING_HW1]);
        assert_eq!(poll_loop.watermark(), 1000);

        poll_loop.poll();
        assert_eq!(sent(&poll_loop), vec![REVIEWING_HW1]);
        assert_eq!(poll_loop.watermark(), 2000);

        poll_loop.poll();
        assert_eq!(
            sent(&poll_loop),
            vec![
                REVIEWING_HW1,
                "Сбой в работе программы: Неизвестный статус домашней работы: bogus"
            ]
        );
        assert_eq!(poll_loop.watermark(), 2000);

        assert_eq!(poll_loop.source.requested, vec![0, 1000, 1000, 2000]);
    }

    #[test]
    fn only_first_homework_is_reported() {
        let (mut poll_loop, _tx_stop) = new_poll_loop(vec![Ok(json!({
            "homeworks": [
                {"homework_name": "hw1", "status": "reviewing"},
                {"homework_name": "hw0", "status": "approved"},
                {"homework_name": "broken"}
            ],
            "current_date": 1000
        }))]);

        poll_loop.poll();
        assert_eq!(sent(&poll_loop), vec![REVIEWING_HW1]);
    }

    #[test]
    fn missing_current_date_keeps_watermark() {
        let (mut poll_loop, _tx_stop) = new_poll_loop(vec![
            Ok(json!({"homeworks": [], "current_date": 1000})),
            Ok(json!({"homeworks": [{"homework_name": "hw1", "status": "reviewing"}]})),
        ]);

        poll_loop.poll();
        poll_loop.poll();
        assert_eq!(poll_loop.watermark(), 1000);
        assert_eq!(sent(&poll_loop), vec![REVIEWING_HW1]);
    }

    #[test]
    fn invalid_current_date_is_reported_and_not_applied() {
        let (mut poll_loop, _tx_stop) = new_poll_loop(vec![Ok(json!({
            "homeworks": [{"homework_name": "hw1", "status": "reviewing"}],
            "current_date": "1000"
        }))]);

        poll_loop.poll();
        assert_eq!(poll_loop.watermark(), 0);
        assert_eq!(
            sent(&poll_loop),
            vec!["Сбой в работе программы: Значение ключа \"current_date\" должно быть целым числом"]
        );
    }

    #[test]
    fn homeworks_not_a_list_is_reported() {
        let (mut poll_loop, _tx_stop) = new_poll_loop(vec![Ok(json!({
            "homeworks": {"homework_name": "hw1", "status": "reviewing"},
            "current_date": 1000
        }))]);

        poll_loop.poll();
        assert_eq!(poll_loop.watermark(), 0);
        assert_eq!(
            sent(&poll_loop),
            vec!["Сбой в работе программы: Значение ключа \"homeworks\" должно быть списком"]
        );
    }

    #[test]
    fn repeated_failure_is_reported_once() {
        let (mut poll_loop, _tx_stop) = new_poll_loop(vec![
            Err(NetworkFault::Status(503)),
            Err(NetworkFault::Status(503)),
            Err(NetworkFault::Status(502)),
            Err(NetworkFault::Status(503)),
        ]);

        for _ in 0..4 {
            poll_loop.poll();
        }
        assert_eq!(
            sent(&poll_loop),
            vec![
                "Сбой в работе программы: Код ответа API: 503",
                "Сбой в работе программы: Код ответа API: 502",
                "Сбой в работе программы: Код ответа API: 503",
            ]
        );
        assert_eq!(poll_loop.source.requested, vec![0, 0, 0, 0]);
    }

    #[test]
    fn recovery_after_failure_is_reported() {
        let (mut poll_loop, _tx_stop) = new_poll_loop(vec![
            Ok(json!({"homeworks": [{"homework_name": "hw1", "status": "reviewing"}], "current_date": 1000})),
            Err(NetworkFault::Status(503)),
            Ok(json!({"homeworks": [{"homework_name": "hw1", "status": "reviewing"}], "current_date": 1000})),
        ]);

        for _ in 0..3 {
            poll_loop.poll();
        }
        assert_eq!(
            sent(&poll_loop),
            vec![
                REVIEWING_HW1,
                "Сбой в работе программы: Код ответа API: 503",
                REVIEWING_HW1,
            ]
        );
    }

    #[test]
    fn notifier_failure_does_not_block_watermark() {
        let (tx_stop, rx_stop) = unbounded();
        let mut poll_loop = PollLoop::new(
            FakeSource::new(vec![Ok(json!({
                "homeworks": [{"homework_name": "hw1", "status": "reviewing"}],
                "current_date": 1000
            }))]),
            FakeNotifier {
                fail: true,
                ..FakeNotifier::default()
            },
            0,
            Duration::ZERO,
            rx_stop,
        );

        poll_loop.poll();
        assert_eq!(poll_loop.watermark(), 1000);
        assert_eq!(poll_loop.notification_state.last_message(), REVIEWING_HW1);
        drop(tx_stop);
    }

    #[test]
    fn run_sleeps_then_keeps_going() {
        let (mut poll_loop, _tx_stop) = new_poll_loop(vec![Ok(json!({"homeworks": []}))]);

        assert!(!poll_loop.run().unwrap());
        assert_eq!(poll_loop.source.requested, vec![0]);
    }

    #[test]
    fn run_stops_after_the_cycle_when_asked() {
        let (poll_loop, tx_stop) = new_poll_loop(vec![
            Ok(json!({"homeworks": [], "current_date": 1000})),
        ]);
        tx_stop.send(()).unwrap();

        // The cycle still runs before the stop request is seen.
        assert!(run_message_source("poll loop", poll_loop).is_ok());
    }

    #[test]
    fn stop_request_is_seen_after_several_cycles() {
        let (mut poll_loop, tx_stop) = new_poll_loop(vec![
            Err(NetworkFault::Status(503)),
            Ok(json!({"homeworks": [], "current_date": 1000})),
        ]);

        assert!(!poll_loop.run().unwrap());
        tx_stop.send(()).unwrap();
        assert!(poll_loop.run().unwrap());
        assert_eq!(poll_loop.source.requested, vec![0, 0]);
        assert_eq!(poll_loop.watermark(), 1000);
    }

    #[test]
    fn run_never_fails_on_cycle_faults() {
        let (mut poll_loop, _tx_stop) = new_poll_loop(vec![
            Err(NetworkFault::Status(502)),
            Ok(json!(["not", "a", "mapping"])),
            Ok(json!({"homeworks": "nope", "current_date": 1000})),
            Ok(json!({"homeworks": [{"status": "approved"}], "current_date": 1000})),
            Ok(json!({"homeworks": [{"homework_name": "hw1", "status": "bogus"}]})),
        ]);

        for _ in 0..5 {
            assert!(!poll_loop.run().unwrap());
        }
        assert_eq!(poll_loop.watermark(), 0);
        assert_eq!(sent(&poll_loop).len(), 5);
    }
}
