/// Redis namespaces for the job queues.
pub const NOTIFICATION_QUEUE_NAMESPACE: &str = "notification_queue";
pub const MEDIA_QUEUE_NAMESPACE: &str = "media_queue";
pub const EXPORT_QUEUE_NAMESPACE: &str = "export_queue";
