//! Gắn thẻ cho từng yêu cầu để bỏ qua phản hồi đã lỗi thời.

/// Thẻ đi kèm một yêu cầu đang bay: đối tượng nhắm tới và thế hệ phát hành.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTicket<K> {
    key: K,
    generation: u64,
}

impl<K> RequestTicket<K> {
    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Chỉ thẻ được phát gần nhất, và còn nhắm đúng đối tượng đang chọn, mới được áp dụng.
#[derive(Debug, Clone)]
pub struct RequestTracker<K> {
    generation: u64,
    active: Option<K>,
}

impl<K> Default for RequestTracker<K> {
    fn default() -> Self {
        Self {
            generation: 0,
            active: None,
        }
    }
}

impl<K: Clone + PartialEq> RequestTracker<K> {
    pub fn begin(&mut self, key: K) -> RequestTicket<K> {
        self.generation += 1;
        self.active = Some(key.clone());
        RequestTicket {
            key,
            generation: self.generation,
        }
    }

    pub fn is_current(&self, ticket: &RequestTicket<K>) -> bool {
        ticket.generation == self.generation && self.active.as_ref() == Some(&ticket.key)
    }

    /// Kết thúc yêu cầu hiện tại; thẻ cũ không còn hợp lệ.
    pub fn finish(&mut self, ticket: &RequestTicket<K>) -> bool {
        if self.is_current(ticket) {
            self.active = None;
            true
        } else {
            false
        }
    }

    /// Bỏ mọi yêu cầu đang chờ (ví dụ khi màn hình bị tháo).
    pub fn cancel(&mut self) {
        self.active = None;
    }

    pub fn in_flight(&self) -> Option<&K> {
        self.active.as_ref()
    }

    /// Tổng số yêu cầu đã phát.
    pub fn issued(&self) -> u64 {
        self.generation
    }
}
