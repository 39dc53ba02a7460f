//! Well-known platform permission and permission-group names

pub const ACCESS_FINE_LOCATION: &str = "android.permission.ACCESS_FINE_LOCATION";
pub const ACCESS_COARSE_LOCATION: &str = "android.permission.ACCESS_COARSE_LOCATION";
pub const ACCESS_BACKGROUND_LOCATION: &str = "android.permission.ACCESS_BACKGROUND_LOCATION";
pub const CAMERA: &str = "android.permission.CAMERA";
pub const BACKGROUND_CAMERA: &str = "android.permission.BACKGROUND_CAMERA";
pub const RECORD_AUDIO: &str = "android.permission.RECORD_AUDIO";
pub const RECORD_BACKGROUND_AUDIO: &str = "android.permission.RECORD_BACKGROUND_AUDIO";
pub const ACTIVITY_RECOGNITION: &str = "android.permission.ACTIVITY_RECOGNITION";
pub const BODY_SENSORS: &str = "android.permission.BODY_SENSORS";
pub const BODY_SENSORS_BACKGROUND: &str = "android.permission.BODY_SENSORS_BACKGROUND";

pub const READ_SMS: &str = "android.permission.READ_SMS";
pub const SEND_SMS: &str = "android.permission.SEND_SMS";
pub const RECEIVE_SMS: &str = "android.permission.RECEIVE_SMS";
pub const RECEIVE_MMS: &str = "android.permission.RECEIVE_MMS";

pub const READ_CONTACTS: &str = "android.permission.READ_CONTACTS";
pub const WRITE_CONTACTS: &str = "android.permission.WRITE_CONTACTS";
pub const READ_CALENDAR: &str = "android.permission.READ_CALENDAR";
pub const WRITE_CALENDAR: &str = "android.permission.WRITE_CALENDAR";
pub const CALL_PHONE: &str = "android.permission.CALL_PHONE";
pub const READ_PHONE_STATE: &str = "android.permission.READ_PHONE_STATE";
pub const READ_EXTERNAL_STORAGE: &str = "android.permission.READ_EXTERNAL_STORAGE";
pub const READ_MEDIA_IMAGES: &str = "android.permission.READ_MEDIA_IMAGES";
pub const POST_NOTIFICATIONS: &str = "android.permission.POST_NOTIFICATIONS";
pub const BLUETOOTH_SCAN: &str = "android.permission.BLUETOOTH_SCAN";
pub const BLUETOOTH_CONNECT: &str = "android.permission.BLUETOOTH_CONNECT";
pub const NEARBY_WIFI_DEVICES: &str = "android.permission.NEARBY_WIFI_DEVICES";

pub mod group {
    pub const LOCATION: &str = "android.permission-group.LOCATION";
    pub const CAMERA: &str = "android.permission-group.CAMERA";
    pub const MICROPHONE: &str = "android.permission-group.MICROPHONE";
    pub const ACTIVITY_RECOGNITION: &str = "android.permission-group.ACTIVITY_RECOGNITION";
    pub const SENSORS: &str = "android.permission-group.SENSORS";
    pub const SMS: &str = "android.permission-group.SMS";
    pub const CONTACTS: &str = "android.permission-group.CONTACTS";
    pub const CALENDAR: &str = "android.permission-group.CALENDAR";
    pub const PHONE: &str = "android.permission-group.PHONE";
    pub const STORAGE: &str = "android.permission-group.STORAGE";
    pub const READ_MEDIA_VISUAL: &str = "android.permission-group.READ_MEDIA_VISUAL";
    pub const NOTIFICATIONS: &str = "android.permission-group.NOTIFICATIONS";
    pub const NEARBY_DEVICES: &str = "android.permission-group.NEARBY_DEVICES";
}
