use crate::domain::value_objects::{ListingId, UserId, ViewRecordId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// ユーザーが物件詳細を閲覧した履歴を表現するドメインエンティティ。
///
/// (user, listing) ごとに 1 件だけ存在し、再閲覧では `viewed_at` と
/// `touch_seq` が更新される。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewRecord {
    id: ViewRecordId,
    user_id: UserId,
    listing_id: ListingId,
    viewed_at: DateTime<Utc>,
    touch_seq: i64,
}

impl ViewRecord {
    /// 既存レコードから閲覧履歴を復元する。
    pub fn from_parts(
        id: ViewRecordId,
        user_id: UserId,
        listing_id: ListingId,
        viewed_at: DateTime<Utc>,
        touch_seq: i64,
    ) -> Self {
        Self {
            id,
            user_id,
            listing_id,
            viewed_at,
            touch_seq,
        }
    }

    pub fn id(&self) -> &ViewRecordId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn listing_id(&self) -> &ListingId {
        &self.listing_id
    }

    pub fn viewed_at(&self) -> DateTime<Utc> {
        self.viewed_at
    }

    /// 同一時刻の閲覧を並べるための単調増加シーケンス
    pub fn touch_seq(&self) -> i64 {
        self.touch_seq
    }
}

/// upsert の結果。新規作成か既存レコードの更新かを区別する。
#[derive(Debug, Clone)]
pub struct RecordedView {
    pub record: ViewRecord,
    pub inserted: bool,
}
